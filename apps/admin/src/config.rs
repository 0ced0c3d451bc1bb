use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use client_core::{catalog::DEFAULT_API_BASE_URL, list_view::DEFAULT_PAGE_SIZE, ViewOptions};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "catalog_admin.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base_url: String,
    pub page_size: usize,
    pub request_timeout_secs: u64,
    pub resort_on_refresh: bool,
    pub export_path: PathBuf,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: 30,
            resort_on_refresh: true,
            export_path: PathBuf::from("products.csv"),
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            page_size: self.page_size,
            resort_on_refresh: self.resort_on_refresh,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_base_url: Option<String>,
    page_size: Option<usize>,
    request_timeout_secs: Option<u64>,
    resort_on_refresh: Option<bool>,
    export_path: Option<PathBuf>,
    log_filter: Option<String>,
}

/// Defaults, then the config file, then environment variables. An explicit
/// `config_path` must exist; the default one is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let file_cfg = match config_path {
        Some(path) => Some(read_file_settings(path)?),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            Some(read_file_settings(Path::new(DEFAULT_CONFIG_PATH))?)
        }
        None => None,
    };
    if let Some(file_cfg) = file_cfg {
        apply_file_settings(&mut settings, file_cfg);
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings.api_base_url = normalize_base_url(&settings.api_base_url);
    Ok(settings)
}

fn read_file_settings(path: &Path) -> anyhow::Result<FileSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    parse_file_settings(&raw)
        .with_context(|| format!("invalid config file '{}'", path.display()))
}

fn parse_file_settings(raw: &str) -> anyhow::Result<FileSettings> {
    Ok(toml::from_str::<FileSettings>(raw)?)
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.page_size.filter(|size| *size > 0) {
        settings.page_size = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs.filter(|secs| *secs > 0) {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file_cfg.resort_on_refresh {
        settings.resort_on_refresh = v;
    }
    if let Some(v) = file_cfg.export_path {
        settings.export_path = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
}

/// Unparseable numeric or boolean values are ignored, as are zero sizes and
/// timeouts.
fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("CATALOG_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = var("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = var("APP__PAGE_SIZE") {
        if let Ok(parsed) = v.trim().parse::<usize>() {
            if parsed > 0 {
                settings.page_size = parsed;
            }
        }
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            if parsed > 0 {
                settings.request_timeout_secs = parsed;
            }
        }
    }

    if let Some(v) = var("APP__RESORT_ON_REFRESH") {
        if let Ok(parsed) = v.trim().parse::<bool>() {
            settings.resort_on_refresh = parsed;
        }
    }

    if let Some(v) = var("APP__EXPORT_PATH") {
        settings.export_path = PathBuf::from(v);
    }

    if let Some(v) = var("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return DEFAULT_API_BASE_URL.to_string();
    }
    trimmed.to_string()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
