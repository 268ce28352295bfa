//! Data provider abstraction for market data sources.
//!
//! Defines the `DataProvider` trait that all data sources implement, and the
//! watchlist fetch helper that tolerates per-ticker failures.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{Interval, PriceSeries};

// ============================================================================
// Provider Error
// ============================================================================

/// Errors specific to data providers.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),
    /// Rate limit exceeded
    #[error("Rate limited by provider")]
    RateLimited,
    /// No data available for the requested ticker/interval
    #[error("Data not available: {0}")]
    DataNotAvailable(String),
    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// Malformed or unexpected provider response
    #[error("Bad response: {0}")]
    BadResponse(String),
}

impl ProviderError {
    /// Check if the error is recoverable (worth retrying on a later run)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::RateLimited)
    }
}

// ============================================================================
// Data Provider Trait
// ============================================================================

/// Trait for market data providers.
///
/// Implementations return a date-ordered [`PriceSeries`]; an empty series is a
/// valid response (the ticker simply has no data for the window), while
/// transport and decoding failures surface as [`ProviderError`].
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Get the provider name (e.g., "yahoo")
    fn name(&self) -> &'static str;

    /// Fetch an OHLCV series for a ticker.
    ///
    /// # Arguments
    /// * `ticker` - Ticker symbol (e.g., "RELIANCE.NS")
    /// * `lookback_days` - History window in calendar days
    /// * `interval` - Bar interval
    async fn fetch_ohlcv(
        &self,
        ticker: &str,
        lookback_days: u32,
        interval: Interval,
    ) -> Result<PriceSeries, ProviderError>;
}

#[async_trait]
impl<P: DataProvider + ?Sized> DataProvider for std::sync::Arc<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn fetch_ohlcv(
        &self,
        ticker: &str,
        lookback_days: u32,
        interval: Interval,
    ) -> Result<PriceSeries, ProviderError> {
        (**self).fetch_ohlcv(ticker, lookback_days, interval).await
    }
}

// ============================================================================
// Watchlist Fetch
// ============================================================================

/// Fetch series for a list of tickers, preserving input order.
///
/// A failed ticker is logged and skipped; it never aborts the batch. Tickers
/// that return an empty series are kept (downstream stages skip them), so the
/// output order always mirrors the input order of the surviving tickers.
pub async fn fetch_many<P: DataProvider>(
    provider: &P,
    tickers: &[String],
    lookback_days: u32,
    interval: Interval,
) -> Vec<(String, PriceSeries)> {
    let mut out = Vec::with_capacity(tickers.len());

    for ticker in tickers {
        match provider.fetch_ohlcv(ticker, lookback_days, interval).await {
            Ok(series) => {
                debug!(ticker = %ticker, bars = series.len(), "Fetched series");
                out.push((ticker.clone(), series));
            }
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "Fetch failed, skipping ticker");
            }
        }
    }

    out
}

// ============================================================================
// Tests
// ============================================================================
