//! Watchlist screener module.
//!
//! Applies a fixed heuristic rule set to the latest row of each ticker's
//! indicator series and aggregates the outcome into one ranked table.
//!
//! # Usage
//!
//! ```ignore
//! use market_research::screener::{run_screener, ScreenerEngine};
//!
//! // Pure, row-level path over already-computed indicator series:
//! let ranked = run_screener(entries.iter().map(|(t, s)| (t.as_str(), s)));
//!
//! // Or the full fetch -> indicators -> screen orchestration:
//! let scan = ScreenerEngine::new(provider, watchlist, 365, Interval::Daily)
//!     .run_scan()
//!     .await?;
//! ```

mod engine;
mod rules;

pub use engine::{evaluate_ticker, run_screener, ScanResult, ScreenResult, ScreenerEngine};
pub use rules::{
    evaluate_row, format_signals, score_row, Signal, SignalCategory, RSI_OVERBOUGHT, RSI_OVERSOLD,
};
