//! Menu rendering from `site.menus.<name>`.

use crate::html::{class_list, escape_attr, escape_html_text};
use crate::site::{SiteContext, StructureNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuMode {
    #[default]
    Tree,
    /// Only the neighbours of the active item.
    PrevNext,
}

impl MenuMode {
    pub fn class(self) -> Option<&'static str> {
        match self {
            MenuMode::Tree => None,
            MenuMode::PrevNext => Some("mode-prev-next"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MenuOptions<'a> {
    pub mode: MenuMode,
    pub ul_class: &'a str,
    /// Defaults to the `item.uuid` prop.
    pub active_uuid: Option<&'a str>,
}

/// Renders the named menu, or `None` when it is missing or renders no items.
pub fn render_menu(site: &SiteContext, name: &str, options: &MenuOptions<'_>) -> Option<String> {
    let menu: Vec<StructureNode> = site.get_json_prop(&format!("site.menus.{name}"))?;
    let active = options
        .active_uuid
        .map(str::to_string)
        .or_else(|| {
            site.get_prop("item.uuid")
                .and_then(|value| value.as_str())
                .map(str::to_string)
        });
    let active = active.as_deref();

    let items: Vec<String> = match options.mode {
        MenuMode::Tree => menu
            .iter()
            .map(|node| tree_item(site, node, active))
            .collect(),
        MenuMode::PrevNext => prev_next_items(site, &menu, active),
    };
    if items.is_empty() {
        return None;
    }

    let classes = class_list([
        "page-menu",
        options.ul_class,
        options.mode.class().unwrap_or_default(),
    ]);
    Some(format!(
        "<ul class=\"{}\">{}</ul>",
        escape_attr(&classes),
        items.concat()
    ))
}

fn label(site: &SiteContext, node: &StructureNode) -> (String, String) {
    let resolved = site.items().iter().find(|resolved| resolved.item.uuid == node.key);
    let title = node
        .title
        .clone()
        .filter(|title| !title.is_empty())
        .or_else(|| resolved.map(|resolved| resolved.item.title.clone()))
        .unwrap_or_default();
    let url = resolved.map(|resolved| resolved.url.clone()).unwrap_or_default();
    (title, url)
}

fn tree_item(site: &SiteContext, node: &StructureNode, active: Option<&str>) -> String {
    let (title, url) = label(site, node);
    let on_path = active.is_some_and(|uuid| node.contains(uuid));
    let classes = if on_path { "active expanded" } else { "" };

    let mut out = format!("<li title=\"{}\"", escape_attr(&title));
    if !classes.is_empty() {
        out.push_str(&format!(" class=\"{classes}\""));
    }
    out.push_str(&format!(
        "><a href=\"{}\">{}</a>",
        escape_attr(&url),
        escape_html_text(&title)
    ));
    if !node.children.is_empty() {
        out.push_str("<ul>");
        for child in &node.children {
            out.push_str(&tree_item(site, child, active));
        }
        out.push_str("</ul>");
    }
    out.push_str("</li>");
    out
}

fn flatten<'a>(nodes: &'a [StructureNode], out: &mut Vec<&'a StructureNode>) {
    for node in nodes {
        out.push(node);
        flatten(&node.children, out);
    }
}

fn prev_next_items(site: &SiteContext, menu: &[StructureNode], active: Option<&str>) -> Vec<String> {
    let mut flat = Vec::new();
    flatten(menu, &mut flat);
    let Some(index) = active.and_then(|uuid| flat.iter().position(|node| node.key == uuid)) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let neighbours = [
        (index.checked_sub(1), "menu-item-prev", "Previous"),
        (Some(index + 1), "menu-item-next", "Next"),
    ];
    for (position, class, caption) in neighbours {
        let Some(node) = position.and_then(|position| flat.get(position)) else {
            continue;
        };
        let (title, url) = label(site, node);
        out.push(format!(
            "<li class=\"{class}\" title=\"{}\"><a href=\"{}\"><span class=\"menu-item-title\">{caption}</span><span class=\"menu-item-label\">{}</span></a></li>",
            escape_attr(&title),
            escape_attr(&url),
            escape_html_text(&title)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::ContentItem;
    use serde_json::json;

    fn site(active: &str) -> SiteContext {
        let item = |uuid: &str, title: &str| ContentItem {
            uuid: uuid.to_string(),
            slug: uuid.to_string(),
            title: title.to_string(),
            ..ContentItem::default()
        };
        SiteContext::new(
            json!({
                "site": {
                    "url": "https://example.com/",
                    "structure": [{"key": "root", "children": [
                        {"key": "docs", "children": [{"key": "intro"}, {"key": "setup"}]},
                        {"key": "about"}
                    ]}],
                    "menus": {
                        "main": [
                            {"key": "docs", "children": [{"key": "intro"}, {"key": "setup"}]},
                            {"key": "about", "title": "About us"}
                        ],
                        "empty": []
                    }
                },
                "item": {"uuid": active}
            }),
            vec![
                item("root", "Home"),
                item("docs", "Docs"),
                item("intro", "Intro"),
                item("setup", "Setup"),
                item("about", "About"),
            ],
        )
    }

    #[test]
    fn tree_marks_active_path() {
        let html = render_menu(&site("setup"), "main", &MenuOptions::default()).expect("menu");
        assert!(html.starts_with("<ul class=\"page-menu\"><li title=\"Docs\" class=\"active expanded\">"));
        assert!(html.contains(
            "<li title=\"Setup\" class=\"active expanded\"><a href=\"https://example.com/docs/setup/\">Setup</a></li>"
        ));
        assert!(html.contains("<li title=\"Intro\"><a"));
        assert!(html.contains("<li title=\"About us\"><a href=\"https://example.com/about/\">About us</a></li>"));
    }

    #[test]
    fn prev_next_mode_shows_neighbours() {
        let options = MenuOptions {
            mode: MenuMode::PrevNext,
            ul_class: "pager",
            active_uuid: None,
        };
        let html = render_menu(&site("intro"), "main", &options).expect("menu");
        assert!(html.starts_with("<ul class=\"page-menu pager mode-prev-next\">"));
        assert!(html.contains("<li class=\"menu-item-prev\" title=\"Docs\">"));
        assert!(html.contains(
            "<span class=\"menu-item-title\">Next</span><span class=\"menu-item-label\">Setup</span>"
        ));

        let last = MenuOptions {
            active_uuid: Some("about"),
            ..options.clone()
        };
        let html = render_menu(&site("intro"), "main", &last).expect("menu");
        assert!(!html.contains("menu-item-next"));
    }

    #[test]
    fn missing_or_empty_menus_render_nothing() {
        let site = site("intro");
        assert_eq!(render_menu(&site, "nope", &MenuOptions::default()), None);
        assert_eq!(render_menu(&site, "empty", &MenuOptions::default()), None);
        let options = MenuOptions {
            mode: MenuMode::PrevNext,
            active_uuid: Some("unknown"),
            ..MenuOptions::default()
        };
        assert_eq!(render_menu(&site, "main", &options), None);
    }
}
