//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/eos/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/eos/` (~/.config/eos/)
//! - Data: `$XDG_DATA_HOME/eos/` (~/.local/share/eos/)
//! - State/Logs: `$XDG_STATE_HOME/eos/` (~/.local/state/eos/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Smallest chart dimension (pixels) the renderer accepts.
pub const MIN_CHART_DIMENSION: u32 = 100;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Database location override
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Analytics configuration
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Chart rendering configuration
    #[serde(default)]
    pub chart: ChartConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Deserialize, Default)]
pub struct DatabaseConfig {
    /// Explicit database file; falls back to the XDG data directory
    pub path: Option<PathBuf>,
}

/// Analytics configuration
#[derive(Debug, Deserialize)]
pub struct AnalyticsConfig {
    /// Field used by the statistics calculator when none is given
    #[serde(default = "default_statistics_field")]
    pub statistics_field: String,

    /// Modules (by key, e.g. "majors") left out of the default engine
    #[serde(default)]
    pub disabled_modules: Vec<String>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            statistics_field: default_statistics_field(),
            disabled_modules: vec![],
        }
    }
}

fn default_statistics_field() -> String {
    "missed_hours".to_string()
}

/// Bar chart dimensions
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ChartConfig {
    /// Image width in pixels
    #[serde(default = "default_chart_width")]
    pub width: u32,

    /// Image height in pixels
    #[serde(default = "default_chart_height")]
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
            height: default_chart_height(),
        }
    }
}

impl ChartConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.width < MIN_CHART_DIMENSION || self.height < MIN_CHART_DIMENSION {
            return Err(Error::Config(format!(
                "chart.width and chart.height must be at least {MIN_CHART_DIMENSION} (got {}x{})",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

fn default_chart_width() -> u32 {
    800
}

fn default_chart_height() -> u32 {
    400
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.chart.validate()?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/eos/config.toml` (~/.config/eos/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("eos").join("config.toml")
    }

    /// Returns the data directory path (for SQLite database)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("eos")
    }

    /// Returns the state directory path (for logs)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("eos")
    }

    /// Returns the default database file path
    ///
    /// `$XDG_DATA_HOME/eos/eos.db` (~/.local/share/eos/eos.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("eos.db")
    }

    /// Database path honoring the `[database] path` override.
    pub fn resolved_database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(Self::database_path)
    }

    /// Returns the log file path
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("eos.log")
    }
}
