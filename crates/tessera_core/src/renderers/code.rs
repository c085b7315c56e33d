use crate::config::CodeTheme;
use crate::dispatch::BlockProps;
use crate::error::BlockError;
use crate::highlight::{highlight_line, language_display_name, parse_highlight_lines};
use crate::html::{escape_attr, escape_html_text};
use crate::renderers::Fields;

const FILE_ICON: &str = "<svg class=\"code-block__file-icon\" width=\"16\" height=\"16\" viewBox=\"0 0 24 24\" fill=\"none\" stroke=\"currentColor\" stroke-width=\"2\"><path d=\"M14 2H6a2 2 0 0 0-2 2v16a2 2 0 0 0 2 2h12a2 2 0 0 0 2-2V8z\"/><path d=\"M14 2v6h6\"/></svg>";
const COPY_ICON: &str = "<svg class=\"copy-icon\" width=\"16\" height=\"16\" viewBox=\"0 0 24 24\" fill=\"none\" stroke=\"currentColor\" stroke-width=\"2\"><rect x=\"9\" y=\"9\" width=\"13\" height=\"13\" rx=\"2\"/><path d=\"M5 15H4a2 2 0 0 1-2-2V4a2 2 0 0 1 2-2h9a2 2 0 0 1 2 2v1\"/></svg>";
const CHECK_ICON: &str = "<svg class=\"copied-icon hidden\" width=\"16\" height=\"16\" viewBox=\"0 0 24 24\" fill=\"none\" stroke=\"currentColor\" stroke-width=\"2\"><path d=\"M20 6 9 17l-5-5\"/></svg>";

pub fn render(props: &BlockProps<'_>) -> Result<String, BlockError> {
    let fields = Fields::from_content(props.content);
    let defaults = &props.options.code;
    let code = fields.text("code").ok_or(BlockError::MissingField("code"))?;
    let title = fields.non_empty("title");
    let description = fields.non_empty("description");
    let file_name = fields.non_empty("fileName");
    let language = fields
        .non_empty("language")
        .unwrap_or_else(|| defaults.language.clone());
    let line_numbers = fields.flag("showLineNumbers", defaults.line_numbers);
    let theme = match fields.text("theme") {
        Some(value) => CodeTheme::parse(&value).unwrap_or(defaults.theme),
        None => defaults.theme,
    };
    let highlighted = parse_highlight_lines(
        &fields.text_or("highlightLines", ""),
        code.split('\n').count(),
    );
    let show_copy = fields.flag("showCopyButton", true);
    let show_header = fields.flag("showHeader", true);

    let mut out = format!(
        "<div class=\"code-block code-block--{}\">",
        theme.as_str()
    );

    if show_header {
        out.push_str("<div class=\"code-block__header\"><div class=\"code-block__meta\">");
        if let Some(file_name) = &file_name {
            out.push_str(&format!(
                "<div class=\"code-block__filename\">{FILE_ICON}{}</div>",
                escape_html_text(file_name)
            ));
        }
        out.push_str(&format!(
            "<div class=\"code-block__language-tag\">{}</div></div>",
            escape_html_text(&language_display_name(&language))
        ));
        if let Some(title) = &title {
            out.push_str(&format!(
                "<div class=\"code-block__title\">{}</div>",
                escape_html_text(title)
            ));
        }
        if let Some(description) = &description {
            out.push_str(&format!(
                "<div class=\"code-block__description\">{}</div>",
                escape_html_text(description)
            ));
        }
        out.push_str("</div>");
    }

    out.push_str(&format!(
        "<div class=\"code-block__container\"><pre class=\"code-block__pre{}\"><code class=\"language-{}\">",
        if line_numbers { " code-block__pre--numbered" } else { "" },
        escape_attr(&language)
    ));
    if line_numbers {
        out.push_str("<div class=\"code-lines\">");
        for (index, line) in code.split('\n').enumerate() {
            let number = index + 1;
            let content = if line.is_empty() {
                " ".to_string()
            } else {
                highlight_line(line, &language)
            };
            out.push_str(&format!(
                "<div class=\"code-line{}\"><span class=\"line-number\">{number}</span><span class=\"line-content\">{content}</span></div>",
                if highlighted.contains(&number) { " code-line--highlighted" } else { "" }
            ));
        }
        out.push_str("</div>");
    } else {
        out.push_str(&format!("<div>{}</div>", highlight_line(&code, &language)));
    }
    out.push_str("</code></pre>");

    if show_copy {
        out.push_str(&format!(
            "<button type=\"button\" class=\"code-block__copy-button\" title=\"Copy code\" data-copy-state=\"idle\">{COPY_ICON}{CHECK_ICON}</button>"
        ));
    }
    out.push_str("</div></div>");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderOptions;
    use serde_json::{Value, json};

    fn try_render(content: Value, options: &RenderOptions) -> Result<String, BlockError> {
        render(&BlockProps {
            id: "code",
            content: &content,
            options,
        })
    }

    #[test]
    fn missing_code_is_an_error() {
        let err = try_render(json!({"fields": {}}), &RenderOptions::default()).expect_err("error");
        assert!(matches!(err, BlockError::MissingField("code")));
    }

    #[test]
    fn plain_block_highlights_whole_snippet() {
        let html = try_render(
            json!({"fields": {"code": "let a = 1;", "fileName": "a.js"}}),
            &RenderOptions::default(),
        )
        .expect("renders");
        assert!(html.starts_with("<div class=\"code-block code-block--light\">"));
        assert!(html.contains("a.js</div>"));
        assert!(html.contains("<div class=\"code-block__language-tag\">JavaScript</div>"));
        assert!(html.contains(
            "<code class=\"language-javascript\"><div><span class=\"token-keyword\">let</span> a <span class=\"token-operator\">=</span> <span class=\"token-number\">1</span>;</div></code>"
        ));
        assert!(html.contains("data-copy-state=\"idle\""));
    }

    #[test]
    fn line_numbers_and_highlighted_lines() {
        let html = try_render(
            json!({"fields": {
                "code": "a\n\nc",
                "language": "python",
                "showLineNumbers": "true",
                "highlightLines": "1,3",
                "theme": "dark",
                "showCopyButton": false,
                "showHeader": "false"
            }}),
            &RenderOptions::default(),
        )
        .expect("renders");
        assert!(html.starts_with("<div class=\"code-block code-block--dark\">"));
        assert!(!html.contains("code-block__header"));
        assert!(!html.contains("code-block__copy-button"));
        assert_eq!(html.matches("code-line--highlighted").count(), 2);
        assert!(html.contains(
            "<div class=\"code-line\"><span class=\"line-number\">2</span><span class=\"line-content\"> </span></div>"
        ));
    }

    #[test]
    fn configured_defaults_apply() {
        let mut options = RenderOptions::default();
        options.code.language = "css".to_string();
        options.code.line_numbers = true;
        let html = try_render(json!({"fields": {"code": "a {}"}}), &options).expect("renders");
        assert!(html.contains("language-css"));
        assert!(html.contains("<span class=\"line-number\">1</span>"));
    }
}
