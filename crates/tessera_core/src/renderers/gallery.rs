use serde::Deserialize;
use url::Url;

use crate::dispatch::BlockProps;
use crate::error::BlockError;
use crate::html::{escape_attr, escape_html_text};
use crate::renderers::Fields;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GalleryImage {
    url: String,
    alt: Option<String>,
    caption: Option<String>,
    thumbnail: Option<String>,
    no_zoom: bool,
}

const CHEVRON_LEFT: &str = "<svg width=\"20\" height=\"20\" viewBox=\"0 0 24 24\" fill=\"none\" stroke=\"currentColor\" stroke-width=\"2\"><path d=\"m15 18-6-6 6-6\"/></svg>";
const CHEVRON_RIGHT: &str = "<svg width=\"20\" height=\"20\" viewBox=\"0 0 24 24\" fill=\"none\" stroke=\"currentColor\" stroke-width=\"2\"><path d=\"m9 18 6-6-6-6\"/></svg>";

pub fn gap_spacing(spacing: &str) -> &'static str {
    match spacing {
        "small" => "0.5rem",
        "large" => "1.5rem",
        _ => "1rem",
    }
}

fn aspect_ratio(value: &str) -> Option<&'static str> {
    match value {
        "square" => Some("1 / 1"),
        "landscape" => Some("16 / 9"),
        "portrait" => Some("4 / 5"),
        "wide" => Some("21 / 9"),
        _ => None,
    }
}

pub fn render(props: &BlockProps<'_>) -> Result<String, BlockError> {
    let fields = Fields::from_content(props.content);
    let title = fields.text_or("title", "Image Gallery");
    let description = fields.text_or("description", "A collection of beautiful images");
    let columns = fields.text_or("columns", "3");
    let carousel = fields.text_or("layout", "grid") == "carousel";
    let show_title = fields.flag("showTitle", true);
    let gap = gap_spacing(&fields.text_or("spacing", "medium"));
    let border_radius = fields.text_or("borderRadius", "8px");
    let lightbox = fields.flag("lightbox", true);
    let ratio = fields.text_or("aspectRatio", "auto");
    let image_height = fields.text_or("imageHeight", "200px");
    let attribution = fields.non_empty("attribution");
    let attribution_link = fields.non_empty("attributionLink");

    let images: Vec<GalleryImage> = fields.json_list_or_empty("images");
    if images.is_empty() {
        return Ok(
            "<div class=\"gallery-empty\"><p>No images to display</p></div>".to_string(),
        );
    }

    let attribution_host = match (&attribution, &attribution_link) {
        (Some(_), Some(link)) => Some(hostname(link).map_err(|err| BlockError::InvalidField {
            field: "attributionLink",
            message: format!("'{link}' is not a valid url: {err}"),
        })?),
        _ => None,
    };

    let mut out = String::from("<div class=\"gallery-container\">");
    let heading = show_title && !title.is_empty();
    if heading || !description.is_empty() {
        out.push_str("<div class=\"gallery-header\">");
        if heading {
            out.push_str(&format!(
                "<h2 class=\"gallery-title\">{}</h2>",
                escape_html_text(&title)
            ));
        }
        if !description.is_empty() {
            out.push_str(&format!(
                "<p class=\"gallery-description\">{}</p>",
                escape_html_text(&description)
            ));
        }
        out.push_str("</div>");
    }

    out.push_str(&format!(
        "<div class=\"gallery-box{}\" style=\"--gallery-gap: {gap}\">",
        if carousel { " carousel-container" } else { "" }
    ));
    if carousel {
        out.push_str(&format!(
            "<button class=\"carousel-nav prev\" data-carousel-direction=\"prev\">{CHEVRON_LEFT}</button><button class=\"carousel-nav next\" data-carousel-direction=\"next\">{CHEVRON_RIGHT}</button>"
        ));
    }
    let gallery_style = if carousel {
        format!("gap: {gap}")
    } else {
        format!("grid-template-columns: repeat({columns}, 1fr)")
    };
    out.push_str(&format!(
        "<div class=\"gallery {}\" style=\"{}\">",
        if carousel { "carousel" } else { "grid" },
        escape_attr(&gallery_style)
    ));

    for (index, image) in images.iter().enumerate() {
        let zoom = lightbox && !image.no_zoom;
        let src = image
            .thumbnail
            .as_deref()
            .filter(|thumb| !thumb.is_empty())
            .unwrap_or(&image.url);
        let alt = match image.alt.as_deref() {
            Some(alt) if !alt.is_empty() => alt.to_string(),
            _ => format!("Gallery image {}", index + 1),
        };

        let mut style = vec![format!("border-radius: {border_radius}")];
        match aspect_ratio(&ratio) {
            Some(value) => style.push(format!("aspect-ratio: {value}")),
            None if ratio == "auto" => style.push(format!("height: {image_height}")),
            None => {}
        }
        if carousel {
            style.push("flex-shrink: 0".to_string());
            style.push(format!(
                "width: calc(100% / {columns} - {gap} * ({columns} - 1) / {columns})"
            ));
        }

        out.push_str(&format!("<img src=\"{}\" alt=\"{}\"", escape_attr(src), escape_attr(&alt)));
        if zoom {
            out.push_str(" data-action=\"zoom\"");
        } else {
            out.push_str(" class=\"no-zoom\"");
        }
        out.push_str(&format!(" data-gallery-url=\"{}\"", escape_attr(&image.url)));
        if let Some(alt) = image.alt.as_deref() {
            out.push_str(&format!(" data-gallery-alt=\"{}\"", escape_attr(alt)));
        }
        if let Some(caption) = image.caption.as_deref().filter(|caption| !caption.is_empty()) {
            out.push_str(&format!(" data-gallery-caption=\"{}\"", escape_attr(caption)));
        }
        out.push_str(&format!(
            " style=\"{}\" loading=\"lazy\">",
            escape_attr(&style.join("; "))
        ));
    }
    out.push_str("</div></div>");

    if let Some(attribution) = attribution {
        out.push_str(&format!(
            "<em class=\"gallery-attribution\">{}",
            escape_html_text(&attribution)
        ));
        if let (Some(link), Some(host)) = (&attribution_link, &attribution_host) {
            out.push_str(&format!(
                " / <a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
                escape_attr(link),
                escape_html_text(host)
            ));
        }
        out.push_str("</em>");
    }
    out.push_str("</div>");
    Ok(out)
}

/// Host name of `link` as a browser reports it: punycode for IDN hosts,
/// empty for urls without a host such as `mailto:`.
pub fn hostname(link: &str) -> Result<String, url::ParseError> {
    let parsed = Url::parse(link)?;
    Ok(parsed.host_str().unwrap_or_default().to_string())
}
