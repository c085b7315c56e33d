use crate::dispatch::BlockProps;
use crate::error::BlockError;
use crate::html::{class_list, escape_attr, escape_html_text};
use crate::renderers::Fields;

pub fn render(props: &BlockProps<'_>) -> Result<String, BlockError> {
    let fields = Fields::from_content(props.content);
    let title = fields.text_or("title", "Card Title");
    let description = fields.text_or(
        "description",
        "This is a description for the card component.",
    );
    let image = fields.non_empty("image");
    let image_position = fields.text_or("imagePosition", "left");
    let button_text = fields.text_or("buttonText", "Learn More");
    let button_url = fields.text_or("buttonUrl", "#");
    let show_button = fields.flag("showButton", true);
    let background = fields.text_or("backgroundColor", "#ffffff");
    let text_color = escape_attr(&fields.text_or("textColor", "#333333"));
    let border_radius = fields.text_or("borderRadius", "8px");
    let padding = fields.text_or("padding", "24px");
    let shadow = fields.text_or("shadow", "medium");

    let position_class = format!("card-block--{image_position}");
    let shadow_class = format!("card-block--shadow-{shadow}");
    let classes = class_list([
        "card-block",
        position_class.as_str(),
        shadow_class.as_str(),
        if image.is_some() {
            "card-block--with-image"
        } else {
            "card-block--no-image"
        },
    ]);
    let style = format!(
        "background-color: {background}; color: {}; border-radius: {border_radius}; padding: {padding}",
        fields.text_or("textColor", "#333333")
    );

    let mut out = format!(
        "<div class=\"card-block-container\"><div class=\"{}\" style=\"{}\">",
        escape_attr(&classes),
        escape_attr(&style)
    );
    if let Some(image) = image {
        out.push_str(&format!(
            "<div class=\"card-block__image\"><img src=\"{}\" alt=\"{}\" style=\"border-radius: {}\"></div>",
            escape_attr(&image),
            escape_attr(&title),
            escape_attr(&border_radius)
        ));
    }
    out.push_str(&format!(
        "<div class=\"card-block__content\"><div class=\"card-block__header\"><h3 class=\"card-block__title\" style=\"color: {text_color}\">{}</h3><p class=\"card-block__description\" style=\"color: {text_color}\">{}</p></div>",
        escape_html_text(&title),
        escape_html_text(&description)
    ));
    if show_button {
        out.push_str(&format!(
            "<div class=\"card-block__footer\"><a class=\"card-block__button\" href=\"{}\" style=\"color: {text_color}\">{}</a></div>",
            escape_attr(&button_url),
            escape_html_text(&button_text)
        ));
    }
    out.push_str("</div></div></div>");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderOptions;
    use serde_json::{Value, json};

    fn render_fields(content: Value) -> String {
        let options = RenderOptions::default();
        render(&BlockProps {
            id: "card",
            content: &content,
            options: &options,
        })
        .expect("card renders")
    }

    #[test]
    fn empty_fields_use_defaults() {
        let html = render_fields(json!({"fields": {}}));
        assert!(html.contains("card-block card-block--left card-block--shadow-medium card-block--no-image"));
        assert!(html.contains(">Card Title</h3>"));
        assert!(html.contains(">This is a description for the card component.</p>"));
        assert!(html.contains("<a class=\"card-block__button\" href=\"#\""));
    }

    #[test]
    fn string_flag_hides_button() {
        let html = render_fields(json!({"fields": {"showButton": "false"}}));
        assert!(!html.contains("card-block__button"));
    }

    #[test]
    fn blank_image_is_ignored() {
        let html = render_fields(json!({"fields": {"image": "  "}}));
        assert!(!html.contains("<img"));
        let html = render_fields(json!({"fields": {"image": "/a.png", "imagePosition": "right"}}));
        assert!(html.contains("card-block--right"));
        assert!(html.contains("<img src=\"/a.png\" alt=\"Card Title\""));
    }
}
