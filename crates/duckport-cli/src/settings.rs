//! Persistent settings for the duckport binary
//!
//! Read from `<config_dir>/duckport/settings.toml`. Every field is optional;
//! a missing file gives the defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PREVIEW_LIMIT: usize = 50;
pub const DEFAULT_LOG_FILTER: &str = "warn,duckport=info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Database opened when `--database` is not given
    pub default_database: Option<PathBuf>,
    /// Rows shown by `preview` when `--limit` is not given
    pub preview_limit: usize,
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_database: None,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
            logging: LoggingSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub filter: String,
    /// Also write JSON logs to daily files under `log_dir`
    pub json_logs: bool,
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            json_logs: false,
            log_dir: None,
        }
    }
}

impl LoggingSettings {
    /// Configured log directory, or the platform data directory
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("duckport")
                .join("logs")
        })
    }
}

impl Settings {
    /// Load from `path`, or from the default location when `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load_from(&Self::settings_path()?),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))
    }

    pub fn settings_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not find config directory")?;
        Ok(config_dir.join("duckport").join("settings.toml"))
    }
}
