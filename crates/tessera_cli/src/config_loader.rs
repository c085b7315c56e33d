use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tessera_core::config::{RenderConfig, RenderOptions, SiteSettings, load_render_config};
use tessera_core::site::DEFAULT_SITE_URL;
use tessera_core::url::UrlStyle;

pub const CONFIG_FILE: &str = "tessera.yaml";

/// Loads `explicit`, or `tessera.yaml` under `root` when present, or defaults.
pub fn load_config(root: &Path, explicit: Option<&PathBuf>) -> Result<RenderConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("config file {} does not exist", path.display());
        }
        return load_render_config(path);
    }
    let path = root.join(CONFIG_FILE);
    if path.exists() {
        log::debug!("using config {}", path.display());
        return load_render_config(&path);
    }
    log::debug!("no {CONFIG_FILE} in {}, using defaults", root.display());
    Ok(default_config())
}

pub fn default_config() -> RenderConfig {
    RenderConfig {
        site: SiteSettings {
            url: DEFAULT_SITE_URL.to_string(),
            url_style: UrlStyle::Pretty,
        },
        options: RenderOptions::default(),
    }
}
