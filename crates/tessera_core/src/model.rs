//! Core block and document models

use serde_json::Value;

/// Attribute marking an element as an embedded block.
pub const BLOCK_ATTR: &str = "data-block";
/// Reserved `data-block` value for blocks whose whole descriptor is JSON.
pub const JSON_BLOCK_SENTINEL: &str = "json";
pub const CONTENT_ATTR: &str = "data-content";
pub const STYLES_ATTR: &str = "data-styles";
pub const SPECIALIZED_TYPE_ATTR: &str = "data-specialized-type";
pub const BLOCK_ID_ATTR: &str = "data-block-id";
pub const PLACEHOLDER_ATTR: &str = "data-block-placeholder";

#[derive(Debug, Clone, PartialEq)]
pub struct BlockDescriptor {
    pub id: String,
    pub block_type: String,
    pub specialized_type: Option<String>,
    pub content: Value,
    pub styles: Option<String>,
    pub placeholder: String,
}

impl BlockDescriptor {
    /// Registry key: the specialized type when present, the block type otherwise.
    pub fn renderer_key(&self) -> &str {
        match self.specialized_type.as_deref() {
            Some(specialized) if !specialized.is_empty() => specialized,
            _ => &self.block_type,
        }
    }
}

pub fn placeholder_token(index: usize) -> String {
    format!("__BLOCK_{index}__")
}

pub fn placeholder_markup(token: &str) -> String {
    format!("<div {PLACEHOLDER_ATTR}=\"{token}\"></div>")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedDocument {
    pub processed_html: String,
    pub blocks: Vec<BlockDescriptor>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ProcessedDocument {
    pub fn block_by_placeholder(&self, placeholder: &str) -> Option<&BlockDescriptor> {
        self.blocks
            .iter()
            .find(|block| block.placeholder == placeholder)
    }

    /// Ids used by more than one descriptor, in first-seen order.
    pub fn duplicate_ids(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut duplicates = Vec::new();
        for block in &self.blocks {
            if !seen.insert(block.id.as_str()) && !duplicates.contains(&block.id.as_str()) {
                duplicates.push(block.id.as_str());
            }
        }
        duplicates
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderNode<'a> {
    Html(&'a str),
    Block(&'a BlockDescriptor),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub block_id: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(block_id: Option<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            block_id,
            message: message.into(),
        }
    }
}
