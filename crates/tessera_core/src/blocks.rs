//! Extraction of embedded block descriptors from server-rendered HTML

use markup5ever_rcdom::Handle;
use serde_json::Value;

use crate::dom;
use crate::model::{
    BLOCK_ATTR, BLOCK_ID_ATTR, BlockDescriptor, CONTENT_ATTR, Diagnostic, JSON_BLOCK_SENTINEL,
    PLACEHOLDER_ATTR, ProcessedDocument, SPECIALIZED_TYPE_ATTR, STYLES_ATTR, placeholder_token,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockSource {
    Json,
    Styled,
}

impl BlockSource {
    fn fallback_id(self, index: usize) -> String {
        match self {
            BlockSource::Json => format!("block-{index}"),
            BlockSource::Styled => format!("styled-block-{index}"),
        }
    }

    fn label(self) -> &'static str {
        match self {
            BlockSource::Json => "block",
            BlockSource::Styled => "styled block",
        }
    }
}

pub fn parse_block_elements(content: &str) -> ProcessedDocument {
    let dom = dom::parse_html_document(content);
    let Some(body) = dom::find_element(&dom.document, "body") else {
        return ProcessedDocument::default();
    };

    let mut blocks = Vec::new();
    let mut diagnostics = Vec::new();

    let mut json_elements = Vec::new();
    dom::collect_elements(&body, &is_json_block, &mut json_elements);
    for (index, element) in json_elements.iter().enumerate() {
        extract_block(element, index, BlockSource::Json, &mut blocks, &mut diagnostics);
    }

    let mut styled_elements = Vec::new();
    dom::collect_elements(&body, &is_styled_block, &mut styled_elements);
    for (index, element) in styled_elements.iter().enumerate() {
        extract_block(element, index, BlockSource::Styled, &mut blocks, &mut diagnostics);
    }

    let mut document = ProcessedDocument {
        processed_html: dom::serialize_children(&body),
        blocks,
        diagnostics,
    };
    let duplicates: Vec<String> = document
        .duplicate_ids()
        .into_iter()
        .map(str::to_string)
        .collect();
    for id in duplicates {
        log::warn!("duplicate block id '{id}'");
        document
            .diagnostics
            .push(Diagnostic::warning(Some(id), "duplicate block id"));
    }
    document
}

fn is_json_block(handle: &Handle) -> bool {
    dom::attr(handle, BLOCK_ATTR).as_deref() == Some(JSON_BLOCK_SENTINEL)
}

fn is_styled_block(handle: &Handle) -> bool {
    dom::has_attr(handle, BLOCK_ATTR)
        && dom::has_attr(handle, STYLES_ATTR)
        && !is_json_block(handle)
        && !dom::has_attr(handle, PLACEHOLDER_ATTR)
}

fn extract_block(
    element: &Handle,
    index: usize,
    source: BlockSource,
    blocks: &mut Vec<BlockDescriptor>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(raw) = dom::attr(element, CONTENT_ATTR) else {
        return;
    };
    let payload = match decode_payload(&raw) {
        Ok(payload) => payload,
        Err(message) => {
            log::error!("failed to parse {} data: {message}", source.label());
            diagnostics.push(Diagnostic::warning(
                dom::attr(element, BLOCK_ID_ATTR),
                format!("malformed {} payload: {message}", source.label()),
            ));
            return;
        }
    };

    let styles = non_empty(dom::attr(element, STYLES_ATTR));
    let placeholder = placeholder_token(blocks.len());
    let descriptor = match source {
        BlockSource::Json => BlockDescriptor {
            id: payload_id(&payload).unwrap_or_else(|| source.fallback_id(index)),
            block_type: payload_str(&payload, "type").unwrap_or_default(),
            specialized_type: non_empty(dom::attr(element, SPECIALIZED_TYPE_ATTR))
                .or_else(|| payload_str(&payload, "specializedType")),
            content: payload.get("content").cloned().unwrap_or(Value::Null),
            styles,
            placeholder,
        },
        BlockSource::Styled => BlockDescriptor {
            id: non_empty(dom::attr(element, BLOCK_ID_ATTR))
                .unwrap_or_else(|| source.fallback_id(index)),
            block_type: dom::attr(element, BLOCK_ATTR).unwrap_or_default(),
            specialized_type: None,
            content: payload.get("content").cloned().unwrap_or(Value::Null),
            styles,
            placeholder,
        },
    };

    let marker = dom::new_element("div", &[(PLACEHOLDER_ATTR, &descriptor.placeholder)]);
    if dom::replace_node(element, marker) {
        blocks.push(descriptor);
    }
}

fn decode_payload(raw: &str) -> Result<Value, String> {
    let text = raw.replace("&quot;", "\"");
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Null) => Err("payload is null".to_string()),
        Ok(value) => Ok(value),
        Err(err) => Err(err.to_string()),
    }
}

fn payload_id(payload: &Value) -> Option<String> {
    match payload.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(number) if number.as_f64() != Some(0.0) => Some(number.to_string()),
        _ => None,
    }
}

fn payload_str(payload: &Value, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DiagnosticLevel;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn json_block(payload: &str) -> String {
        format!(
            "<div data-block=\"json\" data-content=\"{}\"></div>",
            payload.replace('"', "&quot;")
        )
    }

    #[test]
    fn document_without_blocks_is_unchanged() {
        let html = "<h1>Title</h1><p>Some <em>text</em>.</p>";
        let doc = parse_block_elements(html);
        assert!(doc.blocks.is_empty());
        assert!(doc.diagnostics.is_empty());
        assert_eq!(doc.processed_html, html);
    }

    #[test]
    fn json_block_is_replaced_by_placeholder() {
        let html = format!(
            "<p>before</p>{}<p>after</p>",
            json_block(r#"{"id":"hero-1","type":"hero","content":{"fields":{"title":"Hi"}}}"#)
        );
        let doc = parse_block_elements(&html);
        assert_eq!(doc.blocks.len(), 1);
        let block = &doc.blocks[0];
        assert_eq!(block.id, "hero-1");
        assert_eq!(block.block_type, "hero");
        assert_eq!(block.placeholder, "__BLOCK_0__");
        assert_eq!(block.content, json!({"fields": {"title": "Hi"}}));
        assert_eq!(
            doc.processed_html,
            "<p>before</p><div data-block-placeholder=\"__BLOCK_0__\"></div><p>after</p>"
        );
    }

    #[test]
    fn missing_id_falls_back_to_selection_index() {
        let html = format!(
            "{}{}",
            json_block(r#"{"type":"hero","content":{}}"#),
            json_block(r#"{"type":"card","content":{}}"#)
        );
        let doc = parse_block_elements(&html);
        let ids: Vec<&str> = doc.blocks.iter().map(|block| block.id.as_str()).collect();
        assert_eq!(ids, vec!["block-0", "block-1"]);
    }

    #[test]
    fn specialized_type_attribute_wins_over_payload() {
        let html = format!(
            "<div data-block=\"json\" data-specialized-type=\"code\" data-content=\"{}\"></div>",
            r#"{"type":"generic","specializedType":"hero","content":{}}"#.replace('"', "&quot;")
        );
        let doc = parse_block_elements(&html);
        assert_eq!(doc.blocks[0].specialized_type.as_deref(), Some("code"));
        assert_eq!(doc.blocks[0].renderer_key(), "code");
    }

    #[test]
    fn styles_attribute_is_carried() {
        let html = format!(
            "<div data-block=\"json\" data-styles=\"color: red\" data-content=\"{}\"></div>",
            r#"{"type":"hero","content":{}}"#.replace('"', "&quot;")
        );
        let doc = parse_block_elements(&html);
        assert_eq!(doc.blocks[0].styles.as_deref(), Some("color: red"));
    }

    #[test]
    fn malformed_payload_is_isolated() {
        let html = format!(
            "{}<div data-block=\"json\" data-content=\"{{not json\">broken</div>{}{}",
            json_block(r#"{"type":"a","content":1}"#),
            json_block(r#"{"type":"b","content":2}"#),
            json_block(r#"{"type":"c","content":3}"#)
        );
        let doc = parse_block_elements(&html);
        assert_eq!(doc.blocks.len(), 3);
        assert!(
            doc.processed_html
                .contains("<div data-block=\"json\" data-content=\"{not json\">broken</div>")
        );
        assert_eq!(doc.diagnostics.len(), 1);
        assert_eq!(doc.diagnostics[0].level, DiagnosticLevel::Warning);
        let placeholders: Vec<&str> = doc
            .blocks
            .iter()
            .map(|block| block.placeholder.as_str())
            .collect();
        assert_eq!(placeholders, vec!["__BLOCK_0__", "__BLOCK_1__", "__BLOCK_2__"]);
    }

    #[test]
    fn element_without_content_attribute_is_skipped() {
        let html = "<div data-block=\"json\">nothing</div>";
        let doc = parse_block_elements(html);
        assert!(doc.blocks.is_empty());
        assert_eq!(doc.processed_html, html);
    }

    #[test]
    fn styled_blocks_follow_json_blocks() {
        let html = format!(
            "<div data-block=\"gallery\" data-block-id=\"g1\" data-styles=\"margin: 0\" data-content=\"{}\"></div>{}<div data-block=\"card\" data-styles=\"padding: 1px\" data-content=\"{}\"></div>",
            r#"{"content":{"fields":{}}}"#.replace('"', "&quot;"),
            json_block(r#"{"type":"hero","content":{}}"#),
            r#"{"content":null}"#.replace('"', "&quot;")
        );
        let doc = parse_block_elements(&html);
        let summary: Vec<(&str, &str, &str)> = doc
            .blocks
            .iter()
            .map(|block| {
                (
                    block.id.as_str(),
                    block.block_type.as_str(),
                    block.placeholder.as_str(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("block-0", "hero", "__BLOCK_0__"),
                ("g1", "gallery", "__BLOCK_1__"),
                ("styled-block-1", "card", "__BLOCK_2__"),
            ]
        );
        assert_eq!(
            doc.processed_html,
            "<div data-block-placeholder=\"__BLOCK_1__\"></div><div data-block-placeholder=\"__BLOCK_0__\"></div><div data-block-placeholder=\"__BLOCK_2__\"></div>"
        );
    }

    #[test]
    fn blocks_without_styles_are_not_styled_blocks() {
        let html = "<div data-block=\"card\" data-content=\"{}\"></div>";
        let doc = parse_block_elements(html);
        assert!(doc.blocks.is_empty());
    }

    #[test]
    fn duplicate_ids_are_reported() {
        let html = format!(
            "{}{}",
            json_block(r#"{"id":"same","type":"a","content":{}}"#),
            json_block(r#"{"id":"same","type":"b","content":{}}"#)
        );
        let doc = parse_block_elements(&html);
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.duplicate_ids(), vec!["same"]);
        assert!(
            doc.diagnostics
                .iter()
                .any(|diag| diag.block_id.as_deref() == Some("same"))
        );
    }

    #[test]
    fn null_payload_is_rejected() {
        let html = "<div data-block=\"json\" data-content=\"null\"></div>";
        let doc = parse_block_elements(html);
        assert!(doc.blocks.is_empty());
        assert_eq!(doc.diagnostics.len(), 1);
    }
}
