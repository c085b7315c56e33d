//! Site data accessors over an explicitly constructed context.

use std::cell::OnceCell;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::url::{UrlMapper, UrlStyle, join_url};

pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";
pub const COMPONENT_TEMPLATE: &str = "component";

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct StructureNode {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub children: Vec<StructureNode>,
}

impl StructureNode {
    /// True when `uuid` is this node or any descendant.
    pub fn contains(&self, uuid: &str) -> bool {
        self.key == uuid || self.children.iter().any(|child| child.contains(uuid))
    }

    pub fn find(&self, uuid: &str) -> Option<&StructureNode> {
        if self.key == uuid {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(uuid))
    }
}

/// True when `uuid` appears anywhere in `nodes`.
pub fn has_item(uuid: &str, nodes: &[StructureNode]) -> bool {
    nodes.iter().any(|node| node.contains(uuid))
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub uuid: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub template: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An item placed in the site structure.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedItem {
    pub item: ContentItem,
    /// Slug path below the root node, e.g. `blog/first-post`.
    pub path: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub enum TemplateFilter<'a> {
    #[default]
    Any,
    One(&'a str),
    AnyOf(&'a [&'a str]),
}

impl TemplateFilter<'_> {
    fn matches(&self, template: &str) -> bool {
        match self {
            TemplateFilter::Any => true,
            TemplateFilter::One(expected) => *expected == template,
            TemplateFilter::AnyOf(expected) => expected.contains(&template),
        }
    }
}

/// Result of [`SiteContext::walk_structure`].
#[derive(Debug, Clone, PartialEq)]
pub struct WalkedNode {
    pub key: String,
    pub fields: Map<String, Value>,
    pub children: Vec<WalkedNode>,
}

#[derive(Debug)]
pub struct SiteContext {
    data: Value,
    items: Vec<ContentItem>,
    structure: Vec<StructureNode>,
    mapper: UrlMapper,
    resolved: OnceCell<Vec<ResolvedItem>>,
}

impl SiteContext {
    pub fn new(data: Value, items: Vec<ContentItem>) -> Self {
        let mut context = Self {
            data: Value::Null,
            items: Vec::new(),
            structure: Vec::new(),
            mapper: UrlMapper::new(UrlStyle::Pretty),
            resolved: OnceCell::new(),
        };
        context.reset(data, items);
        context
    }

    pub fn with_url_style(mut self, style: UrlStyle) -> Self {
        self.mapper = UrlMapper::new(style);
        self.resolved = OnceCell::new();
        self
    }

    /// Replaces the site data and items and drops every memoized lookup.
    pub fn reset(&mut self, data: Value, items: Vec<ContentItem>) {
        if data.is_null() {
            log::error!("site context loaded with empty data");
        }
        self.structure = match data.pointer("/site/structure") {
            Some(value) => match Vec::<StructureNode>::deserialize(value) {
                Ok(structure) => structure,
                Err(err) => {
                    log::error!("site.structure could not be parsed: {err}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        self.data = data;
        self.items = items;
        self.resolved = OnceCell::new();
    }

    /// Dotted lookup (`site.menus.main`). Numeric segments index arrays.
    pub fn get_prop(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(&self.data, |value, segment| match value {
            Value::Object(map) => map.get(segment),
            Value::Array(list) => segment.parse::<usize>().ok().and_then(|i| list.get(i)),
            _ => None,
        })
    }

    pub fn prop_exists(&self, path: &str) -> bool {
        self.get_prop(path).is_some_and(|value| !value.is_null())
    }

    /// Reads a prop holding JSON text (or inline JSON) into `T`.
    pub fn get_json_prop<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        let value = self.get_prop(path).filter(|value| !value.is_null())?;
        let parsed = match value {
            Value::String(text) => serde_json::from_str(text),
            other => T::deserialize(other),
        };
        match parsed {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                log::error!("prop '{path}' could not be parsed: {err}");
                None
            }
        }
    }

    pub fn site_url(&self) -> String {
        match self.get_prop("site.url").and_then(Value::as_str) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => DEFAULT_SITE_URL.to_string(),
        }
    }

    /// Site url plus `path`, both with a trailing slash.
    pub fn path_url(&self, path: &str) -> String {
        let mut url = self.site_url();
        if !url.ends_with('/') {
            url.push('/');
        }
        url.push_str(path);
        if !path.is_empty() && !path.ends_with('/') {
            url.push('/');
        }
        url
    }

    pub fn structure(&self) -> &[StructureNode] {
        &self.structure
    }

    /// `/<key>/<key>...` for every node, depth first.
    pub fn structure_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        push_paths(&self.structure, "", &mut out);
        out
    }

    pub fn raw_item(&self, uuid: &str) -> Option<&ContentItem> {
        self.items.iter().find(|item| item.uuid == uuid)
    }

    /// Every structure node with a matching item, in structure order.
    pub fn items(&self) -> &[ResolvedItem] {
        self.resolved.get_or_init(|| self.resolve_items())
    }

    /// Items filtered by template, optionally newest first.
    pub fn get_items(&self, filter: TemplateFilter<'_>, sort: bool) -> Vec<&ResolvedItem> {
        let mut out: Vec<&ResolvedItem> = self
            .items()
            .iter()
            .filter(|resolved| filter.matches(&resolved.item.template))
            .collect();
        if sort {
            out.sort_by(|a, b| b.item.created_at.cmp(&a.item.created_at));
        }
        out
    }

    pub fn item(&self, uuid: &str) -> Option<&ResolvedItem> {
        let found = self.items().iter().find(|resolved| resolved.item.uuid == uuid);
        if found.is_none() {
            log::error!("no item found with id {uuid}");
        }
        found
    }

    pub fn item_by_slug(&self, slug: &str) -> Option<&ResolvedItem> {
        self.items().iter().find(|resolved| resolved.item.slug == slug)
    }

    pub fn component(&self, slug: &str) -> Option<&ResolvedItem> {
        self.items().iter().find(|resolved| {
            resolved.item.template == COMPONENT_TEMPLATE && resolved.item.slug == slug
        })
    }

    pub fn find_in_structure(&self, uuid: &str) -> Option<&StructureNode> {
        self.structure.iter().find_map(|node| node.find(uuid))
    }

    pub fn item_children(&self, uuid: &str) -> Vec<&ResolvedItem> {
        let Some(node) = self.find_in_structure(uuid) else {
            return Vec::new();
        };
        node.children
            .iter()
            .filter_map(|child| self.item(&child.key))
            .collect()
    }

    pub fn item_children_by_slug(&self, slug: &str) -> Vec<&ResolvedItem> {
        match self.item_by_slug(slug) {
            Some(resolved) => self.item_children(&resolved.item.uuid),
            None => Vec::new(),
        }
    }

    /// Maps `nodes` through `fields`. Nodes without an item keep their shape
    /// and get no fields.
    pub fn walk_structure<F>(&self, nodes: &[StructureNode], fields: F) -> Vec<WalkedNode>
    where
        F: Fn(&ContentItem) -> Map<String, Value>,
    {
        nodes.iter().map(|node| self.walk_node(node, &fields)).collect()
    }

    fn walk_node<F>(&self, node: &StructureNode, fields: &F) -> WalkedNode
    where
        F: Fn(&ContentItem) -> Map<String, Value>,
    {
        let Some(item) = self.raw_item(&node.key) else {
            return plain_node(node);
        };
        WalkedNode {
            key: node.key.clone(),
            fields: fields(item),
            children: node
                .children
                .iter()
                .map(|child| self.walk_node(child, fields))
                .collect(),
        }
    }

    fn resolve_items(&self) -> Vec<ResolvedItem> {
        let site_url = self.site_url();
        let mut out = Vec::new();
        for path in self.structure_paths() {
            let keys: Vec<&str> = path.split('/').filter(|key| !key.is_empty()).collect();
            let Some(item) = keys.last().and_then(|key| self.raw_item(key)) else {
                continue;
            };
            // the root node does not contribute to the path
            let slug_path = keys
                .iter()
                .skip(1)
                .filter_map(|key| self.raw_item(key))
                .map(|item| item.slug.as_str())
                .filter(|slug| !slug.is_empty())
                .collect::<Vec<_>>()
                .join("/");
            let url = join_url(&site_url, &self.mapper.map(&slug_path).href);
            out.push(ResolvedItem {
                item: item.clone(),
                path: slug_path,
                url,
            });
        }
        out
    }
}

fn push_paths(nodes: &[StructureNode], prefix: &str, out: &mut Vec<String>) {
    for node in nodes {
        let path = format!("{prefix}/{}", node.key);
        out.push(path.clone());
        push_paths(&node.children, &path, out);
    }
}

fn plain_node(node: &StructureNode) -> WalkedNode {
    WalkedNode {
        key: node.key.clone(),
        fields: Map::new(),
        children: node.children.iter().map(plain_node).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(uuid: &str, slug: &str, template: &str, created_at: i64) -> ContentItem {
        ContentItem {
            uuid: uuid.to_string(),
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            template: template.to_string(),
            created_at: Some(created_at),
            ..ContentItem::default()
        }
    }

    fn context() -> SiteContext {
        let data = json!({
            "site": {
                "url": "https://example.com",
                "menus": {"main": [{"key": "b"}]},
                "structure": [
                    {"key": "home", "children": [
                        {"key": "blog", "children": [{"key": "p1"}, {"key": "p2"}, {"key": "ghost"}]},
                        {"key": "footer"}
                    ]}
                ]
            },
            "config": "{\"columns\": 3}",
            "item": {"uuid": "p1"}
        });
        SiteContext::new(
            data,
            vec![
                item("home", "home", "home", 0),
                item("blog", "blog", "blog", 1),
                item("p1", "first", "post", 10),
                item("p2", "second", "post", 20),
                item("footer", "footer", COMPONENT_TEMPLATE, 5),
            ],
        )
    }

    #[test]
    fn props_and_urls() {
        let site = context();
        assert_eq!(site.get_prop("item.uuid"), Some(&json!("p1")));
        assert_eq!(site.get_prop("site.menus.main.0.key"), Some(&json!("b")));
        assert!(site.prop_exists("site.structure"));
        assert!(!site.prop_exists("site.missing.deep"));
        let config: Value = site.get_json_prop("config").expect("json prop");
        assert_eq!(config["columns"], 3);
        assert_eq!(site.path_url("blog"), "https://example.com/blog/");
        assert_eq!(site.path_url(""), "https://example.com/");
        let empty = SiteContext::new(json!({}), Vec::new());
        assert_eq!(empty.site_url(), DEFAULT_SITE_URL);
    }

    #[test]
    fn structure_paths_are_depth_first() {
        assert_eq!(
            context().structure_paths(),
            vec![
                "/home",
                "/home/blog",
                "/home/blog/p1",
                "/home/blog/p2",
                "/home/blog/ghost",
                "/home/footer"
            ]
        );
    }

    #[test]
    fn items_resolve_paths_and_skip_missing() {
        let site = context();
        let items = site.items();
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].path, "");
        assert_eq!(items[0].url, "https://example.com/");
        assert_eq!(items[2].path, "blog/first");
        assert_eq!(items[2].url, "https://example.com/blog/first/");

        let html = context().with_url_style(UrlStyle::Html);
        assert_eq!(html.items()[2].url, "https://example.com/blog/first.html");
    }

    #[test]
    fn filtering_and_sorting() {
        let site = context();
        let posts = site.get_items(TemplateFilter::One("post"), true);
        let slugs: Vec<&str> = posts.iter().map(|r| r.item.slug.as_str()).collect();
        assert_eq!(slugs, vec!["second", "first"]);
        let many = site.get_items(TemplateFilter::AnyOf(&["home", "blog"]), false);
        assert_eq!(many.len(), 2);
        assert!(site.component("footer").is_some());
        assert!(site.component("first").is_none());
        assert_eq!(site.item_by_slug("second").map(|r| r.item.uuid.as_str()), Some("p2"));
    }

    #[test]
    fn children_and_search() {
        let site = context();
        let children = site.item_children_by_slug("blog");
        assert_eq!(children.len(), 2);
        assert!(site.item_children("nope").is_empty());
        assert!(has_item("ghost", site.structure()));
        assert!(!has_item("zzz", site.structure()));
        assert_eq!(site.find_in_structure("p2").map(|n| n.key.as_str()), Some("p2"));
    }

    #[test]
    fn walk_structure_maps_known_items() {
        let site = context();
        let walked = site.walk_structure(site.structure(), |item| {
            let mut fields = Map::new();
            fields.insert("title".to_string(), json!(item.title));
            fields
        });
        let blog = &walked[0].children[0];
        assert_eq!(blog.fields["title"], "BLOG");
        assert!(blog.children[2].fields.is_empty());
    }

    #[test]
    fn reset_clears_memoized_items() {
        let mut site = context();
        assert_eq!(site.items().len(), 5);
        site.reset(
            json!({"site": {"structure": [{"key": "x"}]}}),
            vec![item("x", "x", "page", 0)],
        );
        assert_eq!(site.items().len(), 1);
        assert_eq!(site.items()[0].url, "http://localhost:3000/");
    }
}
