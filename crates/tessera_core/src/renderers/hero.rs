use crate::dispatch::BlockProps;
use crate::error::BlockError;
use crate::html::{escape_attr, escape_html_text};
use crate::renderers::Fields;

pub fn render(props: &BlockProps<'_>) -> Result<String, BlockError> {
    let fields = Fields::from_content(props.content);
    let title = fields.non_empty("title");
    let subtitle = fields.non_empty("subtitle");
    let button_text = fields.non_empty("buttonText");
    let button_url = fields.non_empty("buttonUrl");
    let alignment = alignment_modifier(&fields.text_or("alignment", "center"));
    let text_color = fields.text_or("textColor", "#ffffff");
    let overlay_color = fields.text_or("overlayColor", "rgba(0,0,0,0.5)");
    let height = fields.text_or("height", "500px");

    let mut style = format!("height: {height}");
    if let Some(image) = fields.non_empty("backgroundImage") {
        style.push_str(&format!("; background-image: url('{image}')"));
    }
    style.push_str("; background-size: cover; background-position: center");

    let mut out = format!(
        "<div class=\"hero-banner hero-banner--{alignment}\" style=\"{}\">",
        escape_attr(&style)
    );
    if !overlay_color.is_empty() {
        out.push_str(&format!(
            "<div class=\"hero-banner__overlay\" style=\"background-color: {}\"></div>",
            escape_attr(&overlay_color)
        ));
    }
    let color = escape_attr(&text_color);
    out.push_str(&format!(
        "<div class=\"hero-banner__content hero-banner__content--{alignment}\" style=\"color: {color}\">"
    ));
    if let Some(title) = title {
        out.push_str(&format!(
            "<div class=\"hero-banner__title\" style=\"color: {color}\">{}</div>",
            escape_html_text(&title)
        ));
    }
    if let Some(subtitle) = subtitle {
        out.push_str(&format!(
            "<div class=\"hero-banner__subtitle\" style=\"color: {color}\">{}</div>",
            escape_html_text(&subtitle)
        ));
    }
    if let (Some(text), Some(url)) = (button_text, button_url) {
        out.push_str(&format!(
            "<a href=\"{}\" class=\"hero-banner__button btn\" style=\"color: {color}; font-size: 16px\">{}</a>",
            escape_attr(&url),
            escape_html_text(&text)
        ));
    }
    out.push_str("</div></div>");
    Ok(out)
}

fn alignment_modifier(alignment: &str) -> &'static str {
    match alignment {
        "left" => "left",
        "right" => "right",
        _ => "center",
    }
}
