//! Built-in presentational blocks
//!
//! Every built-in reads its settings from `content.fields`. Flags accept real
//! booleans as well as the strings `"true"` and `"false"` produced by the editor.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::dispatch::BlockRegistry;
use crate::error::BlockError;

pub mod accordion;
pub mod card;
pub mod code;
pub mod gallery;
pub mod hero;
pub mod link_list;
pub mod timeline;

pub fn register_builtins(registry: &mut BlockRegistry) {
    registry.register("hero", hero::render);
    registry.register("card", card::render);
    registry.register("accordion", accordion::render);
    registry.register("gallery", gallery::render);
    registry.register("code", code::render);
    registry.register("timeline", timeline::render);
    registry.register("link-list", link_list::render);
}

/// Read-only view over a block's `fields` object.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Fields<'a> {
    pub fn from_content(content: &'a Value) -> Self {
        Self {
            map: content.get("fields").and_then(Value::as_object),
        }
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map?.get(key).filter(|value| !value.is_null())
    }

    /// String value of a field; numbers and booleans are rendered as text.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    /// Like [`Fields::text`], treating an empty string as absent.
    pub fn non_empty(&self, key: &str) -> Option<String> {
        self.text(key).filter(|text| !text.trim().is_empty())
    }

    pub fn text_or(&self, key: &str, default: &str) -> String {
        self.text(key).unwrap_or_else(|| default.to_string())
    }

    pub fn flag(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            None => default,
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(text)) => text == "true",
            Some(_) => false,
        }
    }

    /// A list stored either as a JSON array or as a string holding JSON.
    pub fn json_list<T: DeserializeOwned>(&self, key: &'static str) -> Result<Vec<T>, BlockError> {
        let parsed = match self.get(key) {
            None => return Ok(Vec::new()),
            Some(Value::String(text)) if text.trim().is_empty() => return Ok(Vec::new()),
            Some(Value::String(text)) => serde_json::from_str::<Value>(text),
            Some(value) => Ok(value.clone()),
        };
        let value = parsed.map_err(|source| BlockError::Json { field: key, source })?;
        match value {
            Value::Array(_) => {
                serde_json::from_value(value).map_err(|source| BlockError::Json { field: key, source })
            }
            _ => Ok(Vec::new()),
        }
    }

    /// [`Fields::json_list`] that logs and degrades to an empty list.
    pub fn json_list_or_empty<T: DeserializeOwned>(&self, key: &'static str) -> Vec<T> {
        self.json_list(key).unwrap_or_else(|err| {
            log::error!("{err}");
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        title: String,
    }

    #[test]
    fn flags_accept_strings_and_bools() {
        let content = json!({"fields": {"a": "true", "b": false, "c": "yes", "d": null}});
        let fields = Fields::from_content(&content);
        assert!(fields.flag("a", false));
        assert!(!fields.flag("b", true));
        assert!(!fields.flag("c", true));
        assert!(fields.flag("d", true));
        assert!(fields.flag("missing", true));
    }

    #[test]
    fn text_accepts_numbers() {
        let content = json!({"fields": {"columns": 4, "title": ""}});
        let fields = Fields::from_content(&content);
        assert_eq!(fields.text("columns").as_deref(), Some("4"));
        assert_eq!(fields.text("title").as_deref(), Some(""));
        assert_eq!(fields.non_empty("title"), None);
    }

    #[test]
    fn json_list_from_string_or_array() {
        let content = json!({"fields": {
            "a": "[{\"title\":\"x\"}]",
            "b": [{"title": "y"}],
            "c": "{not json",
            "d": "{}"
        }});
        let fields = Fields::from_content(&content);
        let a: Vec<Item> = fields.json_list("a").expect("a");
        assert_eq!(a, vec![Item { title: "x".to_string() }]);
        let b: Vec<Item> = fields.json_list("b").expect("b");
        assert_eq!(b.len(), 1);
        assert!(fields.json_list::<Item>("c").is_err());
        assert!(fields.json_list_or_empty::<Item>("c").is_empty());
        assert!(fields.json_list::<Item>("d").expect("d").is_empty());
    }

    #[test]
    fn content_without_fields_is_empty() {
        let content = json!("plain");
        let fields = Fields::from_content(&content);
        assert_eq!(fields.text("title"), None);
    }
}
