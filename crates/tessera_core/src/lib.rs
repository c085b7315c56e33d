pub mod animation;
pub mod assemble;
pub mod blocks;
pub mod config;
pub mod dispatch;
mod dom;
pub mod error;
pub mod highlight;
pub mod html;
pub mod menu;
pub mod model;
pub mod renderers;
pub mod runtime;
pub mod site;
pub mod styles;
pub mod text;
pub mod url;

pub use crate::assemble::assemble_nodes;
pub use crate::blocks::parse_block_elements;
pub use crate::dispatch::{BlockProps, BlockRegistry, BlockRenderer, Dispatcher, render_content};
pub use crate::error::{BlockError, ClipboardError};
pub use crate::highlight::{highlight_line, tokenize};
pub use crate::model::{BlockDescriptor, Diagnostic, DiagnosticLevel, ProcessedDocument, RenderNode};
