//! Command execution: rendering files, checking them, and site builds

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Value, json};
use tessera_cache::{CachedPage, RenderCache, fingerprint};
use tessera_core::animation::stylesheet_tag;
use tessera_core::config::{RenderConfig, RenderOptions};
use tessera_core::dispatch::{BlockProps, Dispatcher};
use tessera_core::highlight::Language;
use tessera_core::html::escape_html_text;
use tessera_core::model::DiagnosticLevel;
use tessera_core::parse_block_elements;
use tessera_core::renderers::code;
use tessera_core::site::{ContentItem, ResolvedItem, SiteContext};
use tessera_core::url::UrlMapper;

use crate::walk::relative_to;

/// Renders every file and writes it below `out`, keeping paths relative to `root`.
/// Returns the written paths.
pub fn render_files(
    files: &[PathBuf],
    root: &Path,
    out: &Path,
    dispatcher: &Dispatcher,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for file in files {
        let html = render_file(file, dispatcher)?;
        let out_path = out.join(relative_to(root, file));
        write_output(&out_path, &html)?;
        log::debug!("rendered {} -> {}", file.display(), out_path.display());
        written.push(out_path);
    }
    Ok(written)
}

pub fn render_file(file: &Path, dispatcher: &Dispatcher) -> Result<String> {
    let raw = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    Ok(tessera_core::render_content(&raw, dispatcher))
}

/// Highlights a source file as a standalone code block.
pub fn highlight_file(
    file: &Path,
    language: Option<&str>,
    line_numbers: bool,
    options: &RenderOptions,
) -> Result<String> {
    let code_text = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let language = language
        .map(str::to_string)
        .or_else(|| language_from_extension(file))
        .unwrap_or_else(|| options.code.language.clone());
    let file_name = file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let content = json!({
        "fields": {
            "code": code_text.trim_end_matches('\n'),
            "language": language,
            "fileName": file_name,
            "showLineNumbers": line_numbers,
        }
    });
    let props = BlockProps {
        id: "highlight",
        content: &content,
        options,
    };
    code::render(&props).with_context(|| format!("failed to highlight {}", file.display()))
}

fn language_from_extension(file: &Path) -> Option<String> {
    let ext = file.extension()?.to_str()?;
    Language::from_name(ext).map(|language| language.as_str().to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckProblem {
    pub path: PathBuf,
    pub level: DiagnosticLevel,
    pub block_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct CheckReport {
    pub files: usize,
    pub blocks: usize,
    pub problems: Vec<CheckProblem>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Parses every file and reports parse diagnostics plus blocks no renderer handles.
pub fn check_files(files: &[PathBuf], dispatcher: &Dispatcher) -> Result<CheckReport> {
    let mut report = CheckReport::default();
    for file in files {
        let raw = fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let document = parse_block_elements(&raw);
        report.files += 1;
        report.blocks += document.blocks.len();
        for diagnostic in document.diagnostics {
            report.problems.push(CheckProblem {
                path: file.clone(),
                level: diagnostic.level,
                block_id: diagnostic.block_id,
                message: diagnostic.message,
            });
        }
        for block in &document.blocks {
            let key = block.renderer_key();
            if !dispatcher.is_registered(key) {
                report.problems.push(CheckProblem {
                    path: file.clone(),
                    level: DiagnosticLevel::Error,
                    block_id: Some(block.id.clone()),
                    message: format!("no renderer registered for block type '{key}'"),
                });
            }
        }
    }
    Ok(report)
}

/// Site data plus items, as exported by the content store.
#[derive(Debug, Deserialize)]
pub struct SiteBundle {
    pub data: Value,
    #[serde(default)]
    pub items: Vec<ContentItem>,
}

pub fn load_bundle(path: &Path) -> Result<SiteBundle> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read site bundle {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid site bundle {}", path.display()))
}

#[derive(Debug, Default)]
pub struct BuildSummary {
    pub rendered: usize,
    pub skipped: usize,
    pub unsafe_paths: usize,
    pub page_keys: Vec<String>,
}

/// Renders every resolved item of the site to `out_dir`.
pub fn build_site(
    bundle: SiteBundle,
    config: &RenderConfig,
    out_dir: &Path,
    mut cache: Option<&mut dyn RenderCache>,
) -> Result<BuildSummary> {
    let mut data = bundle.data;
    if data.pointer("/site/url").is_none() {
        if let Some(site) = data.get_mut("site").and_then(Value::as_object_mut) {
            site.insert("url".to_string(), Value::String(config.site.url.clone()));
        }
    }
    let site = SiteContext::new(data, bundle.items).with_url_style(config.site.url_style);
    let mapper = UrlMapper::new(config.site.url_style);
    let dispatcher = Dispatcher::new(config.options.clone());
    let options_key = format!("{:?}", config.options);

    let mut summary = BuildSummary::default();
    for resolved in site.items() {
        if !is_safe_page_path(&resolved.path) {
            log::warn!(
                "skipping item {}: path '{}' leaves the output directory",
                resolved.item.uuid,
                resolved.path
            );
            summary.unsafe_paths += 1;
            continue;
        }
        let page_key = page_key(resolved);
        let output_path = mapper.map(&resolved.path).primary_output;
        let content_hash = fingerprint(&[
            page_key.as_bytes(),
            resolved.item.title.as_bytes(),
            resolved.item.content.as_bytes(),
            resolved.url.as_bytes(),
            options_key.as_bytes(),
        ]);
        summary.page_keys.push(page_key.clone());

        if is_unchanged(&mut cache, &page_key, &content_hash, &output_path, out_dir) {
            log::debug!("skipping unchanged page {page_key}");
            summary.skipped += 1;
            continue;
        }

        let document = parse_block_elements(&resolved.item.content);
        for diagnostic in &document.diagnostics {
            log::warn!("{page_key}: {}", diagnostic.message);
        }
        let body = dispatcher.render_document(&document);
        let html = page_shell(&resolved.item.title, &body, &config.options);
        write_output(&out_dir.join(&output_path), &html)?;
        summary.rendered += 1;

        if let Some(cache) = cache.as_mut() {
            let page = CachedPage {
                page_key: page_key.clone(),
                content_hash,
                output_path,
                block_count: document.blocks.len(),
            };
            if let Err(err) = cache.put(&page) {
                log::warn!("cache put failed for {page_key}: {err}");
            }
        }
    }
    Ok(summary)
}

/// Slug paths stay below the output directory: no `.`/`..` segments,
/// backslashes, drive prefixes or empty segments.
fn is_safe_page_path(path: &str) -> bool {
    path.is_empty()
        || path.split('/').all(|segment| {
            !segment.is_empty()
                && segment != "."
                && segment != ".."
                && !segment.contains(['\\', ':'])
        })
}

fn page_key(resolved: &ResolvedItem) -> String {
    if resolved.path.is_empty() {
        "/".to_string()
    } else {
        resolved.path.clone()
    }
}

fn is_unchanged(
    cache: &mut Option<&mut dyn RenderCache>,
    page_key: &str,
    content_hash: &[u8; 32],
    output_path: &str,
    out_dir: &Path,
) -> bool {
    let Some(cache) = cache.as_mut() else {
        return false;
    };
    match cache.get(page_key) {
        Ok(Some(cached)) => {
            cached.content_hash == *content_hash
                && cached.output_path == output_path
                && out_dir.join(output_path).is_file()
        }
        Ok(None) => false,
        Err(err) => {
            log::warn!("cache get failed for {page_key}: {err}");
            false
        }
    }
}

/// Minimal HTML document around rendered content.
pub fn page_shell(title: &str, body: &str, options: &RenderOptions) -> String {
    let mut head = format!(
        "<meta charset=\"utf-8\"><meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"><title>{}</title>",
        escape_html_text(title)
    );
    if options.inject_animation_styles {
        head.push_str(&stylesheet_tag());
    }
    format!("<!DOCTYPE html>\n<html><head>{head}</head><body>{body}</body></html>\n")
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_shell_injects_stylesheet_when_enabled() {
        let mut options = RenderOptions::default();
        let html = page_shell("A & B", "<p>x</p>", &options);
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains("<style id=\"tessera-animation-styles\">"));
        assert!(html.contains("<body><p>x</p></body>"));

        options.inject_animation_styles = false;
        assert!(!page_shell("t", "", &options).contains("<style"));
    }

    #[test]
    fn page_paths_must_stay_inside_output() {
        assert!(is_safe_page_path(""));
        assert!(is_safe_page_path("docs/intro"));
        assert!(!is_safe_page_path("../x"));
        assert!(!is_safe_page_path("docs/../../x"));
        assert!(!is_safe_page_path("a\\..\\b"));
        assert!(!is_safe_page_path("/etc"));
        assert!(!is_safe_page_path("c:/x"));
    }

    #[test]
    fn languages_follow_extensions() {
        assert_eq!(language_from_extension(Path::new("a.py")).as_deref(), Some("python"));
        assert_eq!(language_from_extension(Path::new("a.tsx")).as_deref(), Some("typescript"));
        assert_eq!(language_from_extension(Path::new("Makefile")), None);
    }
}
