//! Resolution of block descriptors to renderers and the full content pipeline

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::animation::wrap_block;
use crate::assemble::assemble_nodes;
use crate::blocks::parse_block_elements;
use crate::config::RenderOptions;
use crate::error::BlockError;
use crate::html::escape_attr;
use crate::model::{BlockDescriptor, ProcessedDocument, RenderNode};
use crate::renderers;
use crate::styles::parse_styles;

/// Inputs handed to a block renderer.
#[derive(Debug, Clone, Copy)]
pub struct BlockProps<'a> {
    pub id: &'a str,
    pub content: &'a Value,
    pub options: &'a RenderOptions,
}

pub trait BlockRenderer: Send + Sync {
    fn render(&self, props: &BlockProps<'_>) -> Result<String, BlockError>;
}

impl<F> BlockRenderer for F
where
    F: Fn(&BlockProps<'_>) -> Result<String, BlockError> + Send + Sync,
{
    fn render(&self, props: &BlockProps<'_>) -> Result<String, BlockError> {
        self(props)
    }
}

#[derive(Clone, Default)]
pub struct BlockRegistry {
    renderers: HashMap<String, Arc<dyn BlockRenderer>>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in block.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        renderers::register_builtins(&mut registry);
        registry
    }

    pub fn register<R>(&mut self, key: &str, renderer: R) -> &mut Self
    where
        R: BlockRenderer + 'static,
    {
        self.renderers.insert(key.to_string(), Arc::new(renderer));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Arc<dyn BlockRenderer>> {
        self.renderers.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.renderers.contains_key(key)
    }

    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.renderers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl fmt::Debug for BlockRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    builtins: BlockRegistry,
    overrides: BlockRegistry,
    options: RenderOptions,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl Dispatcher {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            builtins: BlockRegistry::builtin(),
            overrides: BlockRegistry::new(),
            options,
        }
    }

    /// Caller-supplied renderers; they shadow built-ins with the same key.
    pub fn with_overrides(mut self, overrides: BlockRegistry) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn resolve(&self, key: &str) -> Option<&Arc<dyn BlockRenderer>> {
        self.overrides.get(key).or_else(|| self.builtins.get(key))
    }

    pub fn is_registered(&self, key: &str) -> bool {
        self.resolve(key).is_some()
    }

    /// Renders one block inside its animated wrapper.
    ///
    /// Returns `None` when no renderer is registered for the block's key.
    pub fn render_block(&self, block: &BlockDescriptor) -> Option<String> {
        let key = block.renderer_key();
        let Some(renderer) = self.resolve(key) else {
            log::warn!("no renderer registered for block type '{key}'");
            return None;
        };

        let styles = parse_styles(block.styles.as_deref(), &self.options.animation);
        let props = BlockProps {
            id: &block.id,
            content: &block.content,
            options: &self.options,
        };
        let inner = match renderer.render(&props) {
            Ok(html) => html,
            Err(err) => {
                log::error!("block '{}' ({key}) failed to render: {err}", block.id);
                return Some(render_error_placeholder(&block.id));
            }
        };
        Some(wrap_block(
            &styles.animation,
            &styles.to_inline_css(),
            &block.id,
            &inner,
        ))
    }

    pub fn render_nodes(&self, nodes: &[RenderNode<'_>]) -> String {
        let mut out = String::new();
        for node in nodes {
            match node {
                RenderNode::Html(html) => {
                    out.push_str("<div>");
                    out.push_str(html);
                    out.push_str("</div>");
                }
                RenderNode::Block(block) => {
                    if let Some(html) = self.render_block(block) {
                        out.push_str(&html);
                    }
                }
            }
        }
        out
    }

    pub fn render_document(&self, document: &ProcessedDocument) -> String {
        let nodes = assemble_nodes(document);
        format!(
            "<div class=\"{}\">{}</div>",
            escape_attr(&self.options.content_class),
            self.render_nodes(&nodes)
        )
    }
}

pub fn render_error_placeholder(id: &str) -> String {
    format!(
        "<div class=\"block-render-error\" data-block-id=\"{}\" hidden></div>",
        escape_attr(id)
    )
}

/// Parses, assembles and renders server HTML containing embedded blocks.
pub fn render_content(content: &str, dispatcher: &Dispatcher) -> String {
    let document = parse_block_elements(content);
    dispatcher.render_document(&document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn block(block_type: &str, content: Value) -> BlockDescriptor {
        BlockDescriptor {
            id: "b1".to_string(),
            block_type: block_type.to_string(),
            specialized_type: None,
            content,
            styles: None,
            placeholder: "__BLOCK_0__".to_string(),
        }
    }

    fn fixed(text: &'static str) -> impl Fn(&BlockProps<'_>) -> Result<String, BlockError> {
        move |_props: &BlockProps<'_>| Ok(text.to_string())
    }

    #[test]
    fn unregistered_type_renders_nothing() {
        let dispatcher = Dispatcher::default();
        assert_eq!(dispatcher.render_block(&block("nope", Value::Null)), None);
    }

    #[test]
    fn override_shadows_builtin() {
        let mut overrides = BlockRegistry::new();
        overrides.register("hero", fixed("<p>custom</p>"));
        let dispatcher = Dispatcher::default().with_overrides(overrides);
        let html = dispatcher
            .render_block(&block("hero", json!({"fields": {"title": "x"}})))
            .expect("rendered");
        assert_eq!(html, "<div id=\"b1\"><p>custom</p></div>");
    }

    #[test]
    fn specialized_type_selects_renderer() {
        let mut overrides = BlockRegistry::new();
        overrides.register("fancy", fixed("fancy"));
        let dispatcher = Dispatcher::default().with_overrides(overrides);
        let mut descriptor = block("generic", Value::Null);
        descriptor.specialized_type = Some("fancy".to_string());
        assert_eq!(
            dispatcher.render_block(&descriptor).as_deref(),
            Some("<div id=\"b1\">fancy</div>")
        );
    }

    #[test]
    fn renderer_error_is_isolated() {
        let mut overrides = BlockRegistry::new();
        overrides.register("broken", |_props: &BlockProps<'_>| -> Result<String, BlockError> {
            Err(BlockError::MissingField("title"))
        });
        let dispatcher = Dispatcher::default().with_overrides(overrides);
        assert_eq!(
            dispatcher.render_block(&block("broken", Value::Null)).as_deref(),
            Some("<div class=\"block-render-error\" data-block-id=\"b1\" hidden></div>")
        );
    }

    #[test]
    fn styles_reach_the_wrapper() {
        let mut overrides = BlockRegistry::new();
        overrides.register("plain", fixed("x"));
        let dispatcher = Dispatcher::default().with_overrides(overrides);
        let mut descriptor = block("plain", Value::Null);
        descriptor.styles =
            Some("margin-top: 2rem; --animation-type: fadeIn; --animation-trigger: onScroll".to_string());
        let html = dispatcher.render_block(&descriptor).expect("rendered");
        assert!(html.starts_with(
            "<div id=\"b1\" class=\"block-animate animate-onscroll entrance-animation\" style=\"margin-top: 2rem; opacity: 0\""
        ));
        assert!(html.contains("data-animation-type=\"fadeIn\""));
        assert!(html.ends_with(">x</div>"));
    }

    #[test]
    fn render_content_wraps_everything() {
        let mut overrides = BlockRegistry::new();
        overrides.register("plain", fixed("B"));
        let dispatcher = Dispatcher::default().with_overrides(overrides);
        let html = render_content(
            "<p>a</p><div data-block=\"json\" data-content=\"{&quot;id&quot;:&quot;k&quot;,&quot;type&quot;:&quot;plain&quot;,&quot;content&quot;:{}}\"></div><p>c</p>",
            &dispatcher,
        );
        assert_eq!(
            html,
            "<div class=\"post-inner-content\"><div><p>a</p></div><div id=\"k\">B</div><div><p>c</p></div></div>"
        );
    }

    #[test]
    fn builtins_are_registered() {
        let registry = BlockRegistry::builtin();
        assert_eq!(
            registry.keys(),
            vec!["accordion", "card", "code", "gallery", "hero", "link-list", "timeline"]
        );
    }
}
