use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use tessera_cli::{config_loader, exec, walk};
use tessera_core::Dispatcher;
use tessera_core::config::RenderOptions;
use tessera_core::model::DiagnosticLevel;

fn json_block(payload: serde_json::Value) -> String {
    format!(
        "<div data-block=\"json\" data-content=\"{}\"></div>",
        payload.to_string().replace('"', "&quot;")
    )
}

fn hero() -> String {
    json_block(json!({"id": "top", "type": "hero", "content": {"fields": {"title": "Hi"}}}))
}

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create dir");
    }
    fs::write(path, contents).expect("write file");
}

#[test]
fn walker_finds_html_files_in_order() {
    let temp = TempDir::new().expect("tempdir");
    let root = temp.path();
    write(&root.join("b.html"), "b");
    write(&root.join("nested/a.html"), "a");
    write(&root.join("_partial.html"), "skip");
    write(&root.join("notes.txt"), "skip");

    let files = walk::collect_html_files(root).expect("walk");
    let rel: Vec<String> = files
        .iter()
        .map(|file| walk::relative_to(root, file).to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(rel, vec!["b.html".to_string(), "nested/a.html".to_string()]);

    let single = walk::collect_html_files(&root.join("b.html")).expect("single file");
    assert_eq!(single.len(), 1);
    assert!(walk::collect_html_files(&root.join("missing")).is_err());
}

#[test]
fn render_writes_mirrored_tree() {
    let temp = TempDir::new().expect("tempdir");
    let src = temp.path().join("src");
    let out = temp.path().join("out");
    write(&src.join("pages/home.html"), &format!("<p>intro</p>{}", hero()));

    let files = walk::collect_html_files(&src).expect("walk");
    let written = exec::render_files(&files, &src, &out, &Dispatcher::default()).expect("render");
    assert_eq!(written, vec![out.join("pages/home.html")]);

    let html = fs::read_to_string(out.join("pages/home.html")).expect("read output");
    assert!(html.starts_with("<div class=\"post-inner-content\"><div><p>intro</p></div><div id=\"top\">"));
    assert!(html.contains("Hi"));
}

#[test]
fn check_reports_unregistered_and_malformed_blocks() {
    let temp = TempDir::new().expect("tempdir");
    let root = temp.path();
    write(&root.join("ok.html"), &hero());
    write(
        &root.join("bad.html"),
        &format!(
            "{}<div data-block=\"json\" data-content=\"{{broken\"></div>",
            json_block(json!({"id": "m1", "type": "mystery", "content": {}}))
        ),
    );

    let files = walk::collect_html_files(root).expect("walk");
    let report = exec::check_files(&files, &Dispatcher::default()).expect("check");
    assert_eq!(report.files, 2);
    assert!(!report.is_clean());
    assert!(report.problems.iter().all(|problem| problem.path.ends_with("bad.html")));
    assert!(report.problems.iter().any(|problem| {
        problem.level == DiagnosticLevel::Error
            && problem.block_id.as_deref() == Some("m1")
            && problem.message.contains("'mystery'")
    }));

    let clean = exec::check_files(&[root.join("ok.html")], &Dispatcher::default()).expect("check");
    assert!(clean.is_clean());
    assert_eq!(clean.blocks, 1);
}

#[test]
fn highlight_uses_extension_language() {
    let temp = TempDir::new().expect("tempdir");
    let file = temp.path().join("demo.py");
    write(&file, "def f():\n    return 1\n");
    let html = exec::highlight_file(&file, None, true, &RenderOptions::default()).expect("highlight");
    assert!(html.contains("<code class=\"language-python\">"));
    assert!(html.contains("demo.py"));
    assert!(html.contains("<span class=\"line-number\">2</span>"));
    assert!(!html.contains("<span class=\"line-number\">3</span>"));

    let forced = exec::highlight_file(&file, Some("json"), false, &RenderOptions::default())
        .expect("highlight");
    assert!(forced.contains("language-json"));
}

#[test]
fn config_falls_back_to_defaults() {
    let temp = TempDir::new().expect("tempdir");
    let config = config_loader::load_config(temp.path(), None).expect("defaults");
    assert_eq!(config, config_loader::default_config());

    write(
        &temp.path().join("tessera.yaml"),
        "site:\n  url: \"https://example.com/\"\n  url_style: html\n",
    );
    let config = config_loader::load_config(temp.path(), None).expect("file config");
    assert_eq!(config.site.url, "https://example.com/");

    let missing = temp.path().join("nope.yaml");
    assert!(config_loader::load_config(temp.path(), Some(&missing)).is_err());
}
