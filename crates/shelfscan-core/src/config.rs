//! Configuration resolution for shelfscan.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Config file (`--config <path>`, else the global settings.json)
//! 3. Environment variables
//! 4. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::schedule::OpeningHours;

/// Complete shelfscan configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub hours: OpeningHours,
}

/// Backend endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Attendance backend base URL.
    pub base_url: String,
    /// Google Books API base URL (the `/volumes` path is appended).
    pub books_url: String,
    /// Per-request timeout (seconds).
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            books_url: "https://www.googleapis.com/books/v1".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Scan loop configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Fixed sampling period (milliseconds), independent of the source's frame rate.
    pub interval_ms: u64,
    /// Refuse to start scanning outside opening hours.
    pub enforce_opening_hours: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 200,
            enforce_opening_hours: false,
        }
    }
}

/// Load configuration with hierarchical resolution.
///
/// An explicit `path` must exist; the global file is optional.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_config_file(path)?,
        None => match global_config_path() {
            Some(global) if global.exists() => load_config_file(&global)?,
            _ => Config::default(),
        },
    };

    apply_overrides(&mut config, |key| std::env::var(key).ok());
    validate(&config)?;
    Ok(config)
}

/// Global config file, `<config dir>/shelfscan/settings.json`
/// (`$XDG_CONFIG_HOME` or `~/.config` on Linux).
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("shelfscan").join("settings.json"))
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

/// Apply `SHELFSCAN_*` overrides. Unparseable values are ignored.
pub fn apply_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("SHELFSCAN_API_URL") {
        config.api.base_url = val;
    }
    if let Some(val) = lookup("SHELFSCAN_BOOKS_URL") {
        config.api.books_url = val;
    }
    if let Some(n) = lookup("SHELFSCAN_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        config.api.timeout_secs = n;
    }
    if let Some(n) = lookup("SHELFSCAN_SCAN_INTERVAL_MS").and_then(|v| v.parse().ok()) {
        config.scanner.interval_ms = n;
    }
    if let Some(b) = lookup("SHELFSCAN_ENFORCE_HOURS").and_then(|v| v.parse().ok()) {
        config.scanner.enforce_opening_hours = b;
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.api.base_url.trim().is_empty() {
        return Err(Error::Config("api.base_url is empty".into()));
    }
    if config.scanner.interval_ms == 0 {
        return Err(Error::Config("scanner.interval_ms must be positive".into()));
    }
    Ok(())
}
