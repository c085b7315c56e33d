use serde::Deserialize;

use crate::dispatch::BlockProps;
use crate::error::BlockError;
use crate::html::{escape_attr, escape_html_text};
use crate::renderers::Fields;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct AccordionItem {
    title: Option<String>,
    /// Trusted HTML from the editor.
    content: Option<String>,
}

const CHEVRON_SVG: &str = "<path d=\"m6 9 6 6 6-6\"/>";

pub fn render(props: &BlockProps<'_>) -> Result<String, BlockError> {
    let fields = Fields::from_content(props.content);
    let title = fields.text_or("title", "Frequently Asked Questions");
    let allow_multiple = fields.flag("allowMultiple", false);
    let first_item_open = fields.flag("firstItemOpen", false);
    let variant = fields.text_or("variant", "default");
    let size = fields.text_or("size", "md");
    let icon_position = fields.text_or("iconPosition", "right");

    let items: Vec<AccordionItem> = fields
        .json_list_or_empty::<Option<AccordionItem>>("items")
        .into_iter()
        .flatten()
        .filter(|item| {
            item.title
                .as_deref()
                .is_some_and(|title| !title.trim().is_empty())
        })
        .collect();

    if items.is_empty() {
        return Ok(concat!(
            "<div class=\"accordion-placeholder\">",
            "<div class=\"accordion-placeholder__title\">Accordion Block</div>",
            "<div class=\"accordion-placeholder__hint\">Configure accordion items in the block editor to display content here.</div>",
            "</div>"
        )
        .to_string());
    }

    let mut out = format!(
        "<div data-slot=\"accordion\" class=\"accordion-block accordion-variant-{} accordion-size-{}\">",
        escape_attr(&variant),
        escape_attr(&size)
    );
    if !title.is_empty() {
        out.push_str(&format!(
            "<div class=\"accordion-header\"><h3 class=\"accordion-block-title\">{}</h3></div>",
            escape_html_text(&title)
        ));
    }
    out.push_str(&format!(
        "<div class=\"accordion-items\" data-allow-multiple=\"{allow_multiple}\" data-first-item-open=\"{first_item_open}\" data-icon-position=\"{}\">",
        escape_attr(&icon_position)
    ));

    for (index, item) in items.iter().enumerate() {
        let active = index == 0 && first_item_open;
        let content_id = format!("{}-accordion-content-{index}", props.id);
        out.push_str(&format!(
            "<div data-slot=\"accordion-item\" class=\"accordion-item{}\">",
            if active { " active" } else { "" }
        ));
        out.push_str(&format!(
            "<button type=\"button\" data-slot=\"accordion-trigger\" data-accordion-trigger class=\"accordion-trigger\" aria-expanded=\"{active}\" aria-controls=\"{}\">",
            escape_attr(&content_id)
        ));
        out.push_str(&format!(
            "<span class=\"accordion-title {}\">{}</span>",
            if active { "font-bold" } else { "font-medium" },
            escape_html_text(item.title.as_deref().unwrap_or_default())
        ));
        out.push_str(&format!(
            "<svg class=\"accordion-chevron{}\" data-slot=\"accordion-icon\" width=\"20\" height=\"20\" viewBox=\"0 0 24 24\" fill=\"none\" stroke=\"currentColor\" stroke-width=\"2\" stroke-linecap=\"round\" stroke-linejoin=\"round\">{CHEVRON_SVG}</svg>",
            if icon_position == "left" { " accordion-chevron--left" } else { "" }
        ));
        out.push_str("</button>");
        out.push_str(&format!(
            "<div class=\"accordion-content\" data-slot=\"accordion-content\" id=\"{}\"><div class=\"accordion-body\" data-slot=\"accordion-body\">{}</div></div>",
            escape_attr(&content_id),
            item.content.as_deref().unwrap_or_default()
        ));
        out.push_str("</div>");
    }
    out.push_str("</div></div>");
    Ok(out)
}
