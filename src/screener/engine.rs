//! Screener engine.
//!
//! Ranks tickers by evaluating the screening rules against the latest row of
//! each indicator series, and orchestrates the full fetch -> indicators ->
//! screen scan over a watchlist.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::data::{fetch_many, DataProvider, Interval};
use crate::indicators::{self, IndicatorSeries};

use super::rules::{evaluate_row, format_signals, score_row};

// ============================================================================
// Screen Result
// ============================================================================

/// One ranked row of screener output.
///
/// Display fields default to NaN when the source row does not carry them;
/// `vol_spike` defaults to 0. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenResult {
    /// Ticker symbol
    pub ticker: String,
    /// Latest close
    pub close: f64,
    /// Latest RSI_14
    pub rsi_14: f64,
    /// Latest MACD histogram
    pub macd_hist: f64,
    /// Latest SMA_50
    pub sma_50: f64,
    /// Latest SMA_200
    pub sma_200: f64,
    /// Volume spike flag (0 or 1)
    pub vol_spike: u8,
    /// Fired signals as "CATEGORY:description", comma-joined; empty when none
    pub signals: String,
    /// Heuristic score in [0, 100]
    pub score: f64,
}

/// Evaluate one ticker's latest row into a result row.
///
/// Returns `None` for an empty series (the ticker is skipped, not an error).
pub fn evaluate_ticker(ticker: &str, series: &IndicatorSeries) -> Option<ScreenResult> {
    let row = series.latest()?;
    let signals = evaluate_row(&row);
    let score = score_row(&row);

    let or_nan = |v: Option<f64>| v.unwrap_or(f64::NAN);
    Some(ScreenResult {
        ticker: ticker.to_string(),
        close: or_nan(row.close),
        rsi_14: or_nan(row.rsi_14),
        macd_hist: or_nan(row.macd_hist),
        sma_50: or_nan(row.sma_50),
        sma_200: or_nan(row.sma_200),
        vol_spike: row.vol_spike,
        signals: format_signals(&signals),
        score,
    })
}

/// Screen an ordered (ticker, series) sequence into a ranked table.
///
/// Empty series are skipped silently. Results are sorted by score descending;
/// the sort is stable, so ties keep the input iteration order.
pub fn run_screener<'a, I>(entries: I) -> Vec<ScreenResult>
where
    I: IntoIterator<Item = (&'a str, &'a IndicatorSeries)>,
{
    let mut results: Vec<ScreenResult> = entries
        .into_iter()
        .filter_map(|(ticker, series)| evaluate_ticker(ticker, series))
        .collect();

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    results
}

// ============================================================================
// Scan Result
// ============================================================================

/// Result of a full watchlist scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Scan ID (timestamp-based)
    pub id: String,
    /// Ranked screener rows (score descending)
    pub rows: Vec<ScreenResult>,
    /// Number of tickers requested
    pub total_requested: usize,
    /// Number of tickers with usable data
    pub total_screened: usize,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// End time
    pub completed_at: DateTime<Utc>,
    /// Duration in seconds
    pub duration_secs: f64,
}

impl ScanResult {
    /// Get the top N rows by score.
    pub fn top(&self, n: usize) -> &[ScreenResult] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Summary string for logging.
    pub fn summary(&self) -> String {
        format!(
            "Screened {}/{} tickers in {:.1}s",
            self.total_screened, self.total_requested, self.duration_secs
        )
    }
}

// ============================================================================
// Screener Engine
// ============================================================================

/// Orchestrates the full scan: fetch watchlist series from the provider,
/// derive indicators, evaluate and rank.
pub struct ScreenerEngine<P: DataProvider> {
    provider: P,
    watchlist: Vec<String>,
    lookback_days: u32,
    interval: Interval,
}

impl<P: DataProvider> ScreenerEngine<P> {
    /// Create a new engine.
    pub fn new(provider: P, watchlist: Vec<String>, lookback_days: u32, interval: Interval) -> Self {
        Self {
            provider,
            watchlist,
            lookback_days,
            interval,
        }
    }

    /// Borrow the underlying provider (e.g., to reuse its cache for extra
    /// fetches after the scan).
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run a full watchlist scan.
    pub async fn run_scan(&self) -> Result<ScanResult> {
        let started_at = Utc::now();
        let id = format!("scan_{}", started_at.format("%Y%m%d_%H%M%S"));

        info!(
            scan_id = %id,
            tickers = self.watchlist.len(),
            provider = self.provider.name(),
            "Starting watchlist scan"
        );

        // Phase 1: fetch raw series (per-ticker failures are skipped inside)
        let fetched = fetch_many(
            &self.provider,
            &self.watchlist,
            self.lookback_days,
            self.interval,
        )
        .await;
        info!(fetched = fetched.len(), "Phase 1 (fetch) complete");

        // Phase 2: derive indicator columns
        let augmented: Vec<(String, IndicatorSeries)> = fetched
            .into_iter()
            .map(|(ticker, series)| {
                let out = indicators::compute(&series);
                debug!(ticker = %ticker, rows = out.len(), "Indicators computed");
                (ticker, out)
            })
            .collect();
        info!("Phase 2 (indicators) complete");

        // Phase 3: evaluate and rank
        let rows = run_screener(augmented.iter().map(|(t, s)| (t.as_str(), s)));
        info!(ranked = rows.len(), "Phase 3 (screen) complete");

        let completed_at = Utc::now();
        let duration_secs = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        let result = ScanResult {
            id,
            total_requested: self.watchlist.len(),
            total_screened: rows.len(),
            rows,
            started_at,
            completed_at,
            duration_secs,
        };

        info!(scan_id = %result.id, "{}", result.summary());
        Ok(result)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Bar, Interval, PriceSeries};
    use chrono::NaiveDate;

    fn make_series(ticker: &str, closes: &[f64]) -> IndicatorSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000_000.0,
            })
            .collect();
        indicators::compute(&PriceSeries::new(ticker, Interval::Daily, bars))
    }

    fn uptrend(ticker: &str, n: usize) -> IndicatorSeries {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64 * 0.5).collect();
        make_series(ticker, &closes)
    }

    fn downtrend(ticker: &str, n: usize) -> IndicatorSeries {
        let closes: Vec<f64> = (0..n).map(|i| 300.0 - i as f64 * 0.5).collect();
        make_series(ticker, &closes)
    }

    /// Accelerating gains keep the MACD histogram positive; a constant-slope
    /// ramp would let it converge to ~0.
    fn accelerating(ticker: &str, n: usize) -> IndicatorSeries {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + (i * i) as f64 * 0.01).collect();
        make_series(ticker, &closes)
    }

    #[test]
    fn test_empty_series_skipped() {
        let empty = indicators::compute(&PriceSeries::empty("B", Interval::Daily));
        let full = uptrend("A", 250);

        let results = run_screener([("A", &full), ("B", &empty)]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].ticker, "A");
    }

    #[test]
    fn test_ranking_descending() {
        let up = uptrend("UP", 250);
        let down = downtrend("DOWN", 250);

        let results = run_screener([("DOWN", &down), ("UP", &up)]);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].ticker, "UP");
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn test_ties_preserve_input_order() {
        // Identical series produce identical scores
        let a = uptrend("A", 250);
        let b = uptrend("B", 250);
        let c = uptrend("C", 250);

        let results = run_screener([("C", &c), ("A", &a), ("B", &b)]);
        let tickers: Vec<&str> = results.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_short_history_defaults_to_nan() {
        // 30 bars: RSI live, SMA_50/200 and MACD missing
        let short = uptrend("S", 30);
        let result = evaluate_ticker("S", &short).unwrap();

        assert!(!result.close.is_nan());
        assert!(!result.rsi_14.is_nan());
        assert!(result.sma_50.is_nan());
        assert!(result.sma_200.is_nan());
        assert!(result.macd_hist.is_nan());
        assert_eq!(result.vol_spike, 0);
        // close > missing-as-0 MAs still scores the trend bonuses
        assert!(result.score >= 70.0);
    }

    #[test]
    fn test_evaluate_ticker_idempotent() {
        let series = uptrend("A", 250);
        let first = evaluate_ticker("A", &series).unwrap();
        let second = evaluate_ticker("A", &series).unwrap();

        assert_eq!(first.signals, second.signals);
        assert_eq!(first.score, second.score);
        assert_eq!(first.close, second.close);
    }

    #[test]
    fn test_uptrend_signals_content() {
        let series = accelerating("UP", 250);
        let result = evaluate_ticker("UP", &series).unwrap();

        assert!(result.signals.contains("MA_50:Above 50SMA"));
        assert!(result.signals.contains("MA_200:Above 200SMA"));
        assert!(result.signals.contains("MACD:Bullish momentum"));
        assert!((0.0..=100.0).contains(&result.score));
    }

    #[tokio::test]
    async fn test_run_scan_with_stub_provider() {
        use crate::data::{DataProvider, ProviderError};
        use async_trait::async_trait;

        struct StubProvider;

        #[async_trait]
        impl DataProvider for StubProvider {
            fn name(&self) -> &'static str {
                "stub"
            }

            async fn fetch_ohlcv(
                &self,
                ticker: &str,
                _lookback_days: u32,
                interval: Interval,
            ) -> Result<PriceSeries, ProviderError> {
                if ticker == "EMPTY" {
                    return Ok(PriceSeries::empty(ticker, interval));
                }
                let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
                let bars = (0..250)
                    .map(|i| {
                        let close = 100.0 + i as f64 * 0.5;
                        Bar {
                            date: start + chrono::Duration::days(i as i64),
                            open: close,
                            high: close + 1.0,
                            low: close - 1.0,
                            close,
                            volume: 1_000_000.0,
                        }
                    })
                    .collect();
                Ok(PriceSeries::new(ticker, interval, bars))
            }
        }

        let engine = ScreenerEngine::new(
            StubProvider,
            vec!["A".to_string(), "EMPTY".to_string(), "B".to_string()],
            365,
            Interval::Daily,
        );

        let scan = engine.run_scan().await.unwrap();
        assert_eq!(scan.total_requested, 3);
        assert_eq!(scan.total_screened, 2);
        assert_eq!(scan.rows.len(), 2);
        assert!(scan.id.starts_with("scan_"));
        assert_eq!(scan.top(1).len(), 1);
        assert_eq!(scan.top(10).len(), 2);
    }
}
