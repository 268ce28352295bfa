//! Yahoo Finance chart API adapter.
//!
//! Fetches OHLCV history from the public chart endpoint:
//! `GET /v8/finance/chart/{ticker}?period1=..&period2=..&interval=..`
//!
//! The endpoint needs no API key. Individual OHLCV points may be `null`
//! (halted sessions, partial bars); a point with a null close is dropped,
//! other null fields are carried as NaN.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Deserialize;
use tracing::debug;

use super::provider::{DataProvider, ProviderError};
use super::{Bar, Interval, PriceSeries};

// ============================================================================
// Constants
// ============================================================================

/// Yahoo Finance API base URL
const YAHOO_API_BASE: &str = "https://query1.finance.yahoo.com";

/// Chart endpoint
const CHART_ENDPOINT: &str = "/v8/finance/chart";

/// HTTP request timeout (seconds)
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// User agent sent with every request; Yahoo rejects bare clients.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; market-research/0.1)";

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

// ============================================================================
// Yahoo Provider
// ============================================================================

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooProvider {
    /// Create a new Yahoo provider with default settings.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: YAHOO_API_BASE.to_string(),
        }
    }

    /// Create a provider pointed at a custom base URL (used in tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::new()
        }
    }

    fn chart_url(&self, ticker: &str) -> String {
        format!("{}{}/{}", self.base_url, CHART_ENDPOINT, ticker)
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataProvider for YahooProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_ohlcv(
        &self,
        ticker: &str,
        lookback_days: u32,
        interval: Interval,
    ) -> Result<PriceSeries, ProviderError> {
        if ticker.is_empty() {
            return Err(ProviderError::InvalidRequest("empty ticker".into()));
        }

        let now = Utc::now();
        let period1 = (now - Duration::days(i64::from(lookback_days))).timestamp();
        let period2 = now.timestamp();

        let response = self
            .client
            .get(self.chart_url(ticker))
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", interval.to_api_param().to_string()),
                ("events", "div,splits".to_string()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if response.status().as_u16() == 429 {
            return Err(ProviderError::RateLimited);
        }
        if !response.status().is_success() {
            return Err(ProviderError::BadResponse(format!(
                "HTTP {} for {}",
                response.status(),
                ticker
            )));
        }

        let body: ChartResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::BadResponse(e.to_string()))?;

        let result = match (body.chart.result, body.chart.error) {
            (Some(mut results), _) if !results.is_empty() => results.remove(0),
            (_, Some(err)) => {
                return Err(ProviderError::DataNotAvailable(format!(
                    "{}: {}",
                    err.code, err.description
                )))
            }
            _ => return Err(ProviderError::DataNotAvailable(ticker.to_string())),
        };

        let bars = parse_bars(&result);
        debug!(ticker, bars = bars.len(), interval = %interval, "Yahoo chart fetched");

        Ok(PriceSeries::new(ticker, interval, bars))
    }
}

// ============================================================================
// Response Parsing
// ============================================================================

/// Convert a chart result into ordered bars.
///
/// Points with a null close are dropped; other null fields become NaN.
/// Intraday timestamps that collapse onto the same date keep the last point
/// for that date so the strictly-increasing-dates invariant holds.
fn parse_bars(result: &ChartResult) -> Vec<Bar> {
    let quote = match result.indicators.quote.first() {
        Some(q) => q,
        None => return Vec::new(),
    };

    let at = |v: &Vec<Option<f64>>, i: usize| v.get(i).copied().flatten();
    let mut bars: Vec<Bar> = Vec::with_capacity(result.timestamp.len());

    for (i, &ts) in result.timestamp.iter().enumerate() {
        let close = match at(&quote.close, i) {
            Some(c) => c,
            None => continue,
        };
        let date = match timestamp_to_date(ts) {
            Some(d) => d,
            None => continue,
        };

        let bar = Bar {
            date,
            open: at(&quote.open, i).unwrap_or(f64::NAN),
            high: at(&quote.high, i).unwrap_or(f64::NAN),
            low: at(&quote.low, i).unwrap_or(f64::NAN),
            close,
            volume: at(&quote.volume, i).unwrap_or(f64::NAN),
        };

        match bars.last_mut() {
            Some(last) if last.date == date => *last = bar,
            _ => bars.push(bar),
        }
    }

    bars
}

fn timestamp_to_date(ts: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp(ts, 0).map(|dt| dt.date_naive())
}

// ============================================================================
// Tests
// ============================================================================
