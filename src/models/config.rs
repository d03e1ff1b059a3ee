// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Search service connection settings
    #[serde(default)]
    pub flickr: FlickrConfig,

    /// Harvest scheduling and windowing settings
    #[serde(default)]
    pub harvest: HarvestConfig,

    /// Archive output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.flickr.api_key.trim().is_empty() {
            return Err(AppError::config("flickr.api_key is empty"));
        }
        if self.flickr.timeout_secs == 0 {
            return Err(AppError::config("flickr.timeout_secs must be > 0"));
        }
        if self.harvest.page_size == 0 {
            return Err(AppError::config("harvest.page_size must be > 0"));
        }
        if self.harvest.pool_size == 0 {
            return Err(AppError::config("harvest.pool_size must be > 0"));
        }
        if self.harvest.narrow_interval == 0 {
            return Err(AppError::config("harvest.narrow_interval must be > 0"));
        }
        if self.harvest.seen_capacity == 0 {
            return Err(AppError::config("harvest.seen_capacity must be > 0"));
        }
        if self.harvest.year_floor > HarvestConfig::year_ceiling() {
            return Err(AppError::config("harvest.year_floor is in the future"));
        }
        Ok(())
    }
}

/// Search service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlickrConfig {
    /// REST endpoint base URL
    #[serde(default = "defaults::endpoint")]
    pub endpoint: String,

    /// API key (empty by default; must be configured)
    #[serde(default)]
    pub api_key: String,

    /// Comma-separated license codes to restrict the search to
    #[serde(default = "defaults::licenses")]
    pub licenses: String,

    /// Machine-tag namespaces a hit must carry at least one tag from
    #[serde(default = "defaults::machine_tags")]
    pub machine_tags: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl Default for FlickrConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::endpoint(),
            api_key: String::new(),
            licenses: defaults::licenses(),
            machine_tags: defaults::machine_tags(),
            timeout_secs: defaults::timeout(),
            user_agent: defaults::user_agent(),
        }
    }
}

/// Harvest scheduling and windowing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Oldest calendar year to scan
    #[serde(default = "defaults::year_floor")]
    pub year_floor: i32,

    /// Maximum concurrently running partition sessions
    #[serde(default = "defaults::pool_size")]
    pub pool_size: usize,

    /// Hits requested per page
    #[serde(default = "defaults::page_size")]
    pub page_size: u32,

    /// Pages fetched per sweep before the window is narrowed
    #[serde(default = "defaults::narrow_interval")]
    pub narrow_interval: u32,

    /// Retries per page request before the page is skipped
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Capacity of the duplicate-ID set
    #[serde(default = "defaults::seen_capacity")]
    pub seen_capacity: usize,
}

impl HarvestConfig {
    /// Newest year to scan: always the current calendar year.
    pub fn year_ceiling() -> i32 {
        use chrono::Datelike;
        chrono::Utc::now().year()
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            year_floor: defaults::year_floor(),
            pool_size: defaults::pool_size(),
            page_size: defaults::page_size(),
            narrow_interval: defaults::narrow_interval(),
            max_retries: defaults::max_retries(),
            seen_capacity: defaults::seen_capacity(),
        }
    }
}

/// Archive output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the archive files are written into
    #[serde(default = "defaults::output_dir")]
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (error, warn, info, debug, trace)
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    pub fn endpoint() -> String {
        "https://api.flickr.com/services/rest/".into()
    }
    // CC-BY, CC-BY-SA, CC-BY-NC and public domain marks.
    pub fn licenses() -> String {
        "1,2,3,4,5,6,7,8,9,10".into()
    }
    pub fn machine_tags() -> String {
        "dwc:,darwincore:,taxonomy:,geo:".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; flickr-harvest/0.1)".into()
    }
    pub fn year_floor() -> i32 {
        2000
    }
    pub fn pool_size() -> usize {
        10
    }
    pub fn page_size() -> u32 {
        100
    }
    pub fn narrow_interval() -> u32 {
        10
    }
    pub fn max_retries() -> u32 {
        3
    }
    pub fn seen_capacity() -> usize {
        1_000_000
    }
    pub fn output_dir() -> String {
        "archive".into()
    }
    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Config {
        let mut config = Config::default();
        config.flickr.api_key = "test-key".to_string();
        config
    }

    #[test]
    fn test_validate_configured_ok() {
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_api_key() {
        assert!(Config::default().validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_pool() {
        let mut config = configured();
        config.harvest.pool_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_future_floor() {
        let mut config = configured();
        config.harvest.year_floor = HarvestConfig::year_ceiling() + 1;
        assert!(config.validate().is_err());
    }
}
