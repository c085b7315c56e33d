//! Interaction models for the rendered blocks.
//!
//! Each model is plain state driven by host events; DOM access goes through
//! small traits so hosts can be swapped out in tests.

pub mod accordion;
pub mod animation;
pub mod carousel;
pub mod copy;
pub mod lightbox;

pub use accordion::AccordionModel;
pub use animation::{AnimationRuntime, AnimationState, AnimationTarget, AnimationTimer};
pub use carousel::{Carousel, Direction, NavState, ScrollMetrics};
pub use copy::{Clipboard, CopyButton, CopyState, extract_code_text};
pub use lightbox::{Lightbox, LightboxHost, LightboxImage, LightboxView, collect_galleries};
