//! Market Research Library
//!
//! Daily watchlist screener: fetches OHLCV history for a configured set of
//! tickers, derives standard technical indicator columns, evaluates a fixed
//! heuristic rule set against the latest row of each series, and produces a
//! ranked daily report.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  market-research (daily batch)                  │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐        │
//! │  │  Data        │   │  Indicators  │   │  Screener    │        │
//! │  │  Provider    │──▶│  RSI / MACD  │──▶│  Rules +     │        │
//! │  │  (+ cache)   │   │  SMA / BB    │   │  Scoring     │        │
//! │  └──────────────┘   └──────────────┘   └──────┬───────┘        │
//! │                                               ▼                │
//! │                                       ┌──────────────┐         │
//! │                                       │  Report      │         │
//! │                                       │  md/html/json│         │
//! │                                       └──────────────┘         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Concepts
//!
//! ## Indicator Columns
//! Each price series is augmented column-wise: a value is `None` until its
//! rolling window is full, with the sole exception of the volume spike flag
//! which defaults to 0.
//!
//! ## Screening Rules
//! Five rule categories (RSI, MACD, MA_50, MA_200, VOLUME), each firing at
//! most one signal per ticker. Signaling and scoring treat missing inputs
//! differently on purpose: a missing field silences a rule but reads as 0
//! when scoring.
//!
//! ## Ranking
//! Tickers are ranked by score descending; the sort is stable so ties keep
//! watchlist order.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod data;
pub mod indicators;
pub mod report;
pub mod screener;

pub use config::Config;
pub use data::{CachedProvider, DataProvider, Interval, PriceSeries, YahooProvider};
pub use report::{IndexSnapshot, ReportFormat, ResearchReport};
pub use screener::{ScanResult, ScreenerEngine};

/// Initialize tracing with an env-filter; `RUST_LOG` overrides the default.
pub fn init_logging(default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
