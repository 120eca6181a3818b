use std::{collections::HashMap, fs, path::Path};

use thiserror::Error;
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "storefront.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontSettings {
    pub api_base_url: String,
    pub log_filter: String,
}

impl Default for StorefrontSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:3000".into(),
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid api base url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("api base url '{0}' cannot be used as a base url")]
    UnsupportedUrl(String),
}

/// Defaults, then `storefront.toml` in the working directory, then the
/// process environment.
pub fn load_settings() -> Result<StorefrontSettings, SettingsError> {
    let settings = load_settings_from(Path::new(DEFAULT_SETTINGS_FILE))?;
    Ok(apply_env_overrides(settings, |key| std::env::var(key).ok()))
}

/// A missing file is not an error; an unreadable or malformed one is.
pub fn load_settings_from(path: &Path) -> Result<StorefrontSettings, SettingsError> {
    let mut settings = StorefrontSettings::default();

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(settings),
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.display().to_string(),
                source,
            })
        }
    };

    let file_cfg =
        toml::from_str::<HashMap<String, String>>(&raw).map_err(|source| SettingsError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    if let Some(v) = file_cfg.get("api_base_url") {
        settings.api_base_url = v.clone();
    }
    if let Some(v) = file_cfg.get("log_filter") {
        settings.log_filter = v.clone();
    }

    Ok(settings)
}

pub fn apply_env_overrides(
    mut settings: StorefrontSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> StorefrontSettings {
    if let Some(v) = lookup("STOREFRONT_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
    settings
}

pub fn prepare_api_base_url(raw_api_base_url: &str) -> Result<Url, SettingsError> {
    let normalized = normalize_api_base_url(raw_api_base_url);
    let url = Url::parse(&normalized).map_err(|source| SettingsError::InvalidUrl {
        url: normalized.clone(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(SettingsError::UnsupportedUrl(normalized));
    }
    Ok(url)
}

fn normalize_api_base_url(raw_api_base_url: &str) -> String {
    let raw_api_base_url = raw_api_base_url.trim();

    if raw_api_base_url.is_empty() {
        return StorefrontSettings::default().api_base_url;
    }

    let with_scheme = if raw_api_base_url.contains("://") {
        raw_api_base_url.to_string()
    } else {
        format!("http://{raw_api_base_url}")
    };

    with_scheme.trim_end_matches('/').to_string()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
