use serde::Deserialize;

use crate::dispatch::BlockProps;
use crate::error::BlockError;
use crate::html::{class_list, escape_attr, escape_html_text};
use crate::renderers::Fields;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LinkItem {
    title: String,
    description: Option<String>,
    url: Option<String>,
    icon: Option<String>,
    open_in_new_tab: bool,
}

const EXTERNAL_ICON: &str = "<svg class=\"link-item-external\" width=\"16\" height=\"16\" viewBox=\"0 0 24 24\" fill=\"none\" stroke=\"currentColor\" stroke-width=\"2\"><path d=\"M15 3h6v6\"/><path d=\"M10 14 21 3\"/><path d=\"M18 13v6a2 2 0 0 1-2 2H5a2 2 0 0 1-2-2V8a2 2 0 0 1 2-2h6\"/></svg>";

struct Layout {
    style: String,
    orientation: String,
    icon_position: String,
    show_descriptions: bool,
    show_icons: bool,
}

pub fn render(props: &BlockProps<'_>) -> Result<String, BlockError> {
    let fields = Fields::from_content(props.content);
    let title = fields.text_or("title", "Link Collection");
    let description = fields.text_or("description", "A curated list of useful links");
    let layout = Layout {
        style: fields.text_or("layoutStyle", "styled"),
        orientation: fields.text_or("layoutOrientation", "list"),
        icon_position: fields.text_or("iconPosition", "left"),
        show_descriptions: fields.flag("showDescriptions", true),
        show_icons: fields.flag("showIcons", true),
    };
    let spacing = fields.text_or("spacing", "medium");

    let mut header = format!(
        "<div class=\"link-list-header\"><div class=\"link-list-title\">{}</div>",
        escape_html_text(&title)
    );
    if !description.is_empty() {
        header.push_str(&format!(
            "<div class=\"link-list-description\">{}</div>",
            escape_html_text(&description)
        ));
    }
    header.push_str("</div>");

    let links: Vec<LinkItem> = fields.json_list_or_empty("links");
    if links.is_empty() {
        return Ok(format!(
            "<div class=\"link-list-container\">{header}<div class=\"link-list-empty\"><div>No links available</div></div></div>"
        ));
    }

    let style_class = format!("link-list--{}", layout.style);
    let orientation_class = format!("link-list--{}", layout.orientation);
    let spacing_class = format!("link-list--spacing-{spacing}");
    let classes = class_list([
        "link-list-container",
        style_class.as_str(),
        orientation_class.as_str(),
        spacing_class.as_str(),
    ]);

    let mut container_style = Vec::new();
    if layout.style == "styled" {
        let background = fields.text_or("backgroundColor", "#ffffff");
        if background != "transparent" {
            container_style.push(format!("background-color: {background}"));
        }
        container_style.push(format!("border-color: {}", fields.text_or("borderColor", "#e5e5e5")));
        container_style.push(format!("border-radius: {}", fields.text_or("borderRadius", "8px")));
        container_style.push(format!("--link-color: {}", fields.text_or("linkColor", "#3b82f6")));
        container_style.push(format!("--hover-color: {}", fields.text_or("hoverColor", "#2563eb")));
        container_style.push(format!("--text-color: {}", fields.text_or("textColor", "#333333")));
    }

    let mut out = format!("<div class=\"{}\"", escape_attr(&classes));
    if !container_style.is_empty() {
        out.push_str(&format!(" style=\"{}\"", escape_attr(&container_style.join("; "))));
    }
    out.push('>');
    out.push_str(&header);
    out.push_str(&format!(
        "<div class=\"link-list-content link-list-content--{}\">",
        escape_attr(&layout.orientation)
    ));
    for link in &links {
        push_link(&mut out, link, &layout);
    }
    out.push_str("</div></div>");
    Ok(out)
}

fn icon_markup(link: &LinkItem, layout: &Layout) -> String {
    match link.icon.as_deref() {
        Some(icon) if layout.show_icons && !icon.is_empty() => {
            format!("<i class=\"{}\"></i>", escape_attr(icon))
        }
        _ => String::new(),
    }
}

fn push_link(out: &mut String, link: &LinkItem, layout: &Layout) {
    let url = link.url.as_deref().filter(|url| !url.trim().is_empty());
    match url {
        Some(url) => {
            out.push_str(&format!("<a href=\"{}\"", escape_attr(url)));
            if link.open_in_new_tab {
                out.push_str(" target=\"_blank\" rel=\"noopener noreferrer\"");
            }
            out.push_str(" class=\"link-item\">");
        }
        None => out.push_str("<div class=\"link-item link-item--no-url\">"),
    }

    out.push_str(&format!(
        "<div class=\"link-item-content link-item--{} link-item--{} link-item--icon-{}\"><div class=\"link-item-header\">",
        escape_attr(&layout.style),
        escape_attr(&layout.orientation),
        escape_attr(&layout.icon_position)
    ));
    if layout.show_icons && layout.icon_position == "left" {
        out.push_str(&format!(
            "<span class=\"link-item-icon link-item-icon--left\">{}</span>",
            icon_markup(link, layout)
        ));
    }
    out.push_str("<div class=\"link-item-text\">");
    if layout.show_icons && layout.icon_position == "top" {
        out.push_str(&format!(
            "<div class=\"link-item-icon link-item-icon--top\">{}</div>",
            icon_markup(link, layout)
        ));
    }
    out.push_str(&format!(
        "<div class=\"link-item-title\">{}</div>",
        escape_html_text(&link.title)
    ));
    if let Some(description) = link.description.as_deref() {
        if layout.show_descriptions && !description.is_empty() {
            out.push_str(&format!(
                "<div class=\"link-item-description\">{}</div>",
                escape_html_text(description)
            ));
        }
    }
    out.push_str("</div>");
    if layout.show_icons && layout.icon_position == "right" {
        let icon = if url.is_some() {
            EXTERNAL_ICON.to_string()
        } else {
            icon_markup(link, layout)
        };
        out.push_str(&format!(
            "<span class=\"link-item-icon link-item-icon--right\">{icon}</span>"
        ));
    }
    out.push_str("</div></div>");
    out.push_str(if url.is_some() { "</a>" } else { "</div>" });
}
