//! Console configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8887";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_STORAGE_PATH: &str = ".console/session.json";
pub const DEFAULT_BRAND: &str = "Lilishop Admin";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Backend origin, without a trailing slash.
    pub base_url: String,
    /// Applied to every request.
    pub request_timeout: Duration,
    pub storage_path: PathBuf,
    /// Suffix appended to every page title.
    pub brand: String,
}

/// Explicit settings that take precedence over the environment, e.g. CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub storage_path: Option<PathBuf>,
    pub brand: Option<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            brand: DEFAULT_BRAND.to_owned(),
        }
    }
}

impl ConsoleConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `CONSOLE_BASE_URL`: default `http://127.0.0.1:8887`
    /// - `CONSOLE_REQUEST_TIMEOUT_SECS`: default 15
    /// - `CONSOLE_STORAGE_PATH`: default `.console/session.json`
    /// - `CONSOLE_BRAND`: default `Lilishop Admin`
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("CONSOLE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        let timeout_secs = env_parse_u64("CONSOLE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let storage_path = std::env::var("CONSOLE_STORAGE_PATH").unwrap_or_else(|_| DEFAULT_STORAGE_PATH.to_owned());
        let brand = std::env::var("CONSOLE_BRAND").unwrap_or_else(|_| DEFAULT_BRAND.to_owned());

        Self {
            base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            storage_path: PathBuf::from(storage_path),
            brand,
        }
        .validated()
    }

    /// Replace every field `overrides` sets, then validate again.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(base_url) = overrides.base_url {
            self.base_url = base_url;
        }
        if let Some(secs) = overrides.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(storage_path) = overrides.storage_path {
            self.storage_path = storage_path;
        }
        if let Some(brand) = overrides.brand {
            self.brand = brand;
        }
        self.validated()
    }

    /// Normalize the base URL and reject values the gateway cannot use.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url(&self.base_url)?;
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue { key: "request_timeout", value: "0".to_owned() });
        }
        Ok(self)
    }
}

fn env_parse_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        Err(_) => Ok(default),
    }
}

pub(crate) fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|_| ConfigError::InvalidBaseUrl(raw.to_owned()))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
