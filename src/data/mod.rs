//! Market data module.
//!
//! Provides the core OHLCV types, the data provider abstraction, a Yahoo
//! Finance adapter, and a TTL cache for fetched series.

mod cache;
mod provider;
mod yahoo;

pub use cache::{CacheStats, CachedProvider, Clock, SeriesCache, SystemClock};
pub use provider::{fetch_many, DataProvider, ProviderError};
pub use yahoo::YahooProvider;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Core Data Types
// ============================================================================

/// Bar interval for OHLCV data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    /// Hourly bars
    Hourly,
    /// Daily bars
    Daily,
    /// Weekly bars
    Weekly,
}

impl Interval {
    /// Parse from a config/API string (e.g., "1d", "1h", "1wk")
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "1h" | "h" | "hourly" => Some(Self::Hourly),
            "1d" | "d" | "daily" => Some(Self::Daily),
            "1wk" | "1w" | "w" | "weekly" => Some(Self::Weekly),
            _ => None,
        }
    }

    /// Convert to the provider API interval parameter
    pub fn to_api_param(&self) -> &'static str {
        match self {
            Self::Hourly => "1h",
            Self::Daily => "1d",
            Self::Weekly => "1wk",
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_api_param())
    }
}

/// A single OHLCV bar.
///
/// Numeric fields may be `f64::NAN` when the source reported no value for
/// that field; a bar with a missing close is dropped at the adapter boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bar {
    /// Bar date
    pub date: NaiveDate,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume
    pub volume: f64,
}

impl Bar {
    /// Check if this is a bullish bar
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Get the full range (high - low)
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// A date-ordered OHLCV series for one ticker.
///
/// Invariant: bar dates are strictly increasing with no duplicates. Adapters
/// are responsible for producing ordered bars; a series violating the
/// ordering invariant is a precondition violation, not a handled error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Ticker symbol (e.g., "RELIANCE.NS")
    pub ticker: String,
    /// Bar interval
    pub interval: Interval,
    /// Date-ordered bars
    pub bars: Vec<Bar>,
}

impl PriceSeries {
    /// Create a new series from ordered bars
    pub fn new(ticker: impl Into<String>, interval: Interval, bars: Vec<Bar>) -> Self {
        let series = Self {
            ticker: ticker.into(),
            interval,
            bars,
        };
        debug_assert!(series.is_ordered(), "bar dates must be strictly increasing");
        series
    }

    /// Create an empty series
    pub fn empty(ticker: impl Into<String>, interval: Interval) -> Self {
        Self::new(ticker, interval, Vec::new())
    }

    /// Number of bars
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Check if the series has no bars
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Get the most recent bar
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Close prices, index-aligned with `bars`
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Volumes, index-aligned with `bars`
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Check the strictly-increasing-dates invariant
    pub fn is_ordered(&self) -> bool {
        self.bars.windows(2).all(|w| w[0].date < w[1].date)
    }
}

// ============================================================================
// Tests
// ============================================================================
