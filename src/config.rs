//! Configuration module.
//!
//! Loads the research run configuration from a YAML file: the watchlist,
//! reference index tickers, data window options, and report output options.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::data::Interval;

// ============================================================================
// Main Configuration
// ============================================================================

/// Configuration for a research run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Tickers to screen, in ranking tie-break order
    #[serde(default)]
    pub watchlist: Vec<String>,

    /// Reference indices for the report overview (display name -> symbol)
    #[serde(default)]
    pub index_tickers: BTreeMap<String, String>,

    /// Data fetch options
    #[serde(default)]
    pub data: DataConfig,

    /// Report output options
    #[serde(default)]
    pub report: ReportConfig,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if config.watchlist.is_empty() {
            bail!("Config has an empty watchlist; nothing to screen");
        }
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watchlist: Vec::new(),
            index_tickers: BTreeMap::new(),
            data: DataConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

// ============================================================================
// Data Configuration
// ============================================================================

/// Data fetch options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// History window in calendar days
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Bar interval ("1d", "1h", "1wk")
    #[serde(default = "default_interval")]
    pub interval: String,

    /// Fetch cache TTL in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: i64,
}

impl DataConfig {
    /// Parse the configured interval string.
    pub fn interval(&self) -> Result<Interval> {
        Interval::parse(&self.interval)
            .with_context(|| format!("Unknown data interval: {}", self.interval))
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
            interval: default_interval(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

fn default_lookback_days() -> u32 {
    365
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_cache_ttl_secs() -> i64 {
    600 // 10 minutes
}

// ============================================================================
// Report Configuration
// ============================================================================

/// Report output options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output directory for report files
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Number of top-ranked tickers to show in the report table
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Report formats to generate
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            top_n: default_top_n(),
            formats: default_formats(),
        }
    }
}

fn default_out_dir() -> String {
    "reports".to_string()
}

fn default_top_n() -> usize {
    10
}

fn default_formats() -> Vec<String> {
    vec!["markdown".to_string(), "html".to_string()]
}

// ============================================================================
// Tests
// ============================================================================
