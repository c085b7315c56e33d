//! Re-threading of block descriptors with the surrounding raw HTML

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{ProcessedDocument, RenderNode};

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<div data-block-placeholder="(__BLOCK_\d+__)"></div>"#)
        .expect("Invalid placeholder regex")
});

/// Splits the processed HTML into an ordered list of raw fragments and blocks.
pub fn assemble_nodes(document: &ProcessedDocument) -> Vec<RenderNode<'_>> {
    let html = document.processed_html.as_str();
    let mut nodes = Vec::new();
    let mut last_end = 0;

    for captures in PLACEHOLDER_RE.captures_iter(html) {
        let (Some(marker), Some(token)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        push_html(&mut nodes, &html[last_end..marker.start()]);
        match document.block_by_placeholder(token.as_str()) {
            Some(block) => nodes.push(RenderNode::Block(block)),
            None => log::error!("no block data found for placeholder {}", token.as_str()),
        }
        last_end = marker.end();
    }
    push_html(&mut nodes, &html[last_end..]);
    nodes
}

fn push_html<'a>(nodes: &mut Vec<RenderNode<'a>>, fragment: &'a str) {
    if !fragment.trim().is_empty() {
        nodes.push(RenderNode::Html(fragment));
    }
}
