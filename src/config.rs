//! Configuration management
//!
//! Handles loading and parsing of JSON configuration files with environment
//! variable overrides for the data directory and cache lifetime.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use thiserror::Error;

use crate::data::DataSource;
use crate::{Period, Symbol};

/// Grid counts accepted by the CLI and config files
pub const GRID_COUNT_RANGE: RangeInclusive<usize> = 3..=20;

/// Longest accepted cache lifetime (one year)
pub const MAX_CACHE_TTL_SECS: i64 = 365 * 24 * 3600;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("grid_count must be between {min} and {max}, got {value}")]
    GridCountOutOfRange { value: usize, min: usize, max: usize },

    #[error("at least one symbol is required")]
    NoSymbols,

    #[error("cache_ttl_secs must be >= 0, got {0}")]
    NegativeCacheTtl(i64),

    #[error("cache_ttl_secs must be <= {max}, got {value}")]
    CacheTtlTooLarge { value: i64, max: i64 },
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub symbols: Vec<String>,
    #[serde(default)]
    pub period: Period,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).context("Failed to read config file")?;
        let mut config: Config =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;

        config.apply_env()?;
        config.validate()?;

        Ok(config)
    }

    /// Override data settings from `GRID_SIGNALS_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var("GRID_SIGNALS_DATA_DIR") {
            self.data.data_dir = dir;
        }
        if let Ok(ttl) = std::env::var("GRID_SIGNALS_CACHE_TTL") {
            self.data.cache_ttl_secs = ttl
                .trim()
                .parse()
                .context("GRID_SIGNALS_CACHE_TTL must be an integer number of seconds")?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;

        if self.symbols.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::NoSymbols);
        }

        if self.data.cache_ttl_secs < 0 {
            return Err(ConfigError::NegativeCacheTtl(self.data.cache_ttl_secs));
        }

        if self.data.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(ConfigError::CacheTtlTooLarge {
                value: self.data.cache_ttl_secs,
                max: MAX_CACHE_TTL_SECS,
            });
        }

        Ok(())
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.symbols
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(Symbol::new)
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            symbols: vec!["2330.TW".to_string()],
            period: Period::default(),
            grid: GridConfig::default(),
            data: DataConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Grid parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of interior grid levels (default: 10)
    #[serde(default = "default_grid_count")]
    pub grid_count: usize,
}

fn default_grid_count() -> usize {
    10
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            grid_count: default_grid_count(),
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !GRID_COUNT_RANGE.contains(&self.grid_count) {
            return Err(ConfigError::GridCountOutOfRange {
                value: self.grid_count,
                min: *GRID_COUNT_RANGE.start(),
                max: *GRID_COUNT_RANGE.end(),
            });
        }
        Ok(())
    }
}

/// Where price series come from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub source: DataSource,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Seconds a fetched series stays fresh (default: 3600)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: i64,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_cache_ttl() -> i64 {
    crate::data::DEFAULT_TTL_SECS
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            source: DataSource::default(),
            data_dir: default_data_dir(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

/// Report export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
}

fn default_results_dir() -> String {
    "results".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            results_dir: default_results_dir(),
        }
    }
}
