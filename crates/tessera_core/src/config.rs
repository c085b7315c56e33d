use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::animation::{AnimationSpec, AnimationTrigger};
use crate::highlight::Language;
use crate::url::UrlStyle;

pub const DEFAULT_CONTENT_CLASS: &str = "post-inner-content";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeTheme {
    #[default]
    Light,
    Dark,
}

impl CodeTheme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(CodeTheme::Light),
            "dark" => Some(CodeTheme::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CodeTheme::Light => "light",
            CodeTheme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeDefaults {
    pub language: String,
    pub theme: CodeTheme,
    pub line_numbers: bool,
}

impl Default for CodeDefaults {
    fn default() -> Self {
        Self {
            language: "javascript".to_string(),
            theme: CodeTheme::Light,
            line_numbers: false,
        }
    }
}

/// Settings every render pass and every block renderer sees.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub content_class: String,
    pub inject_animation_styles: bool,
    pub code: CodeDefaults,
    pub animation: AnimationSpec,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            content_class: DEFAULT_CONTENT_CLASS.to_string(),
            inject_animation_styles: true,
            code: CodeDefaults::default(),
            animation: AnimationSpec::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteSettings {
    pub url: String,
    pub url_style: UrlStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub site: SiteSettings,
    pub options: RenderOptions,
}

#[derive(Debug, Deserialize)]
struct RenderConfigRaw {
    site: SiteSettingsRaw,
    render: Option<RenderSettingsRaw>,
    code: Option<CodeSettingsRaw>,
    animation: Option<AnimationSettingsRaw>,
}

#[derive(Debug, Deserialize)]
struct SiteSettingsRaw {
    url: Option<String>,
    url_style: Option<UrlStyle>,
}

#[derive(Debug, Deserialize)]
struct RenderSettingsRaw {
    content_class: Option<String>,
    inject_animation_styles: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct CodeSettingsRaw {
    language: Option<String>,
    theme: Option<CodeTheme>,
    line_numbers: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct AnimationSettingsRaw {
    trigger: Option<String>,
    duration: Option<f64>,
    delay: Option<f64>,
}

pub fn load_render_config(path: &Path) -> Result<RenderConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_render_config(&raw)
        .with_context(|| format!("invalid config {}", path.display()))
}

pub fn parse_render_config(raw: &str) -> Result<RenderConfig> {
    let parsed: RenderConfigRaw =
        serde_yaml::from_str(raw).context("failed to parse YAML config")?;

    let site = SiteSettings {
        url: required_string(parsed.site.url, "site.url")?,
        url_style: parsed.site.url_style.unwrap_or_default(),
    };

    let mut options = RenderOptions::default();
    if let Some(render) = parsed.render {
        options.content_class = non_empty_or_default(
            render.content_class,
            DEFAULT_CONTENT_CLASS,
            "render.content_class",
        )?;
        options.inject_animation_styles = render.inject_animation_styles.unwrap_or(true);
    }

    if let Some(code) = parsed.code {
        let language = non_empty_or_default(code.language, "javascript", "code.language")?;
        if Language::from_name(&language).is_none() {
            log::warn!("code.language '{language}' has no highlighting rules, javascript rules apply");
        }
        options.code = CodeDefaults {
            language,
            theme: code.theme.unwrap_or_default(),
            line_numbers: code.line_numbers.unwrap_or(false),
        };
    }

    if let Some(animation) = parsed.animation {
        if let Some(trigger) = animation.trigger {
            options.animation.trigger = match AnimationTrigger::parse(&trigger) {
                Some(trigger) => trigger,
                None => bail!("animation.trigger '{trigger}' is not one of onLoad, onVisible, onScroll, onHover, onClick"),
            };
        }
        if let Some(duration) = animation.duration {
            options.animation.duration_secs = non_negative(duration, "animation.duration")?;
        }
        if let Some(delay) = animation.delay {
            options.animation.delay_secs = non_negative(delay, "animation.delay")?;
        }
    }

    Ok(RenderConfig { site, options })
}

fn required_string(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => bail!("missing required field: {}", field),
    }
}

fn non_empty_or_default(value: Option<String>, default: &str, field: &str) -> Result<String> {
    match value {
        Some(text) => {
            if text.trim().is_empty() {
                bail!("{field} must not be empty");
            }
            Ok(text)
        }
        None => Ok(default.to_string()),
    }
}

fn non_negative(value: f64, field: &str) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        bail!("{field} must be >= 0");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn write_temp(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("tessera-config-{}.yaml", Uuid::new_v4()));
        fs::write(&path, contents).expect("write temp config");
        path
    }

    #[test]
    fn valid_minimal_config_parses() {
        let path = write_temp("site:\n  url: \"https://example.com/\"\n");
        let config = load_render_config(&path).expect("config should load");
        assert_eq!(config.site.url, "https://example.com/");
        assert_eq!(config.site.url_style, UrlStyle::Pretty);
        assert_eq!(config.options, RenderOptions::default());
    }

    #[test]
    fn missing_required_field_fails() {
        let path = write_temp("site:\n  url_style: html\n");
        let err = load_render_config(&path).expect_err("expected error");
        assert!(format!("{err:#}").contains("site.url"));
    }

    #[test]
    fn all_sections_apply() {
        let path = write_temp(
            "site:\n  url: \"https://example.com/\"\n  url_style: html\nrender:\n  content_class: \"article\"\n  inject_animation_styles: false\ncode:\n  language: python\n  theme: dark\n  line_numbers: true\nanimation:\n  trigger: onClick\n  duration: 0.5\n  delay: 2\n",
        );
        let config = load_render_config(&path).expect("config should load");
        assert_eq!(config.site.url_style, UrlStyle::Html);
        assert_eq!(config.options.content_class, "article");
        assert!(!config.options.inject_animation_styles);
        assert_eq!(config.options.code.language, "python");
        assert_eq!(config.options.code.theme, CodeTheme::Dark);
        assert!(config.options.code.line_numbers);
        assert_eq!(config.options.animation.trigger, AnimationTrigger::OnClick);
        assert_eq!(config.options.animation.duration_secs, 0.5);
        assert_eq!(config.options.animation.delay_secs, 2.0);
        assert_eq!(config.options.animation.kind, "none");
    }

    #[test]
    fn empty_content_class_fails() {
        let err = parse_render_config(
            "site:\n  url: \"https://example.com/\"\nrender:\n  content_class: \" \"\n",
        )
        .expect_err("expected error");
        assert!(err.to_string().contains("render.content_class must not be empty"));
    }

    #[test]
    fn unknown_trigger_fails() {
        let err = parse_render_config(
            "site:\n  url: \"https://example.com/\"\nanimation:\n  trigger: onWink\n",
        )
        .expect_err("expected error");
        assert!(err.to_string().contains("animation.trigger"));
    }

    #[test]
    fn negative_delay_fails() {
        let err = parse_render_config(
            "site:\n  url: \"https://example.com/\"\nanimation:\n  delay: -1\n",
        )
        .expect_err("expected error");
        assert!(err.to_string().contains("animation.delay must be >= 0"));
    }
}
