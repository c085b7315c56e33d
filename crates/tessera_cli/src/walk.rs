//! Input discovery for the render and check commands

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use walkdir::WalkDir;

/// `path` itself when it is a file, otherwise every `.html` file below it,
/// sorted. Names starting with `_` are skipped.
pub fn collect_html_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        bail!("{} does not exist", path.display());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(path).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let file = entry.path();
        if file.extension().and_then(|ext| ext.to_str()) != Some("html") {
            continue;
        }
        if file
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with('_'))
        {
            continue;
        }
        files.push(file.to_path_buf());
    }
    files.sort();
    Ok(files)
}

/// Path of `file` relative to `root`, or its file name when it is not below it.
pub fn relative_to(root: &Path, file: &Path) -> PathBuf {
    match file.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
        _ => file
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| file.to_path_buf()),
    }
}
