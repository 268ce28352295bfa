//! Indicator series and latest-row snapshot types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::PriceSeries;

// ============================================================================
// Indicator Series
// ============================================================================

/// A price series augmented with derived indicator columns.
///
/// Every column is index-aligned with `source.bars`; `None` marks positions
/// where the rolling window is not yet full. `vol_spike` is the one
/// boolean-like column and degrades to 0 instead of going missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSeries {
    /// The source OHLCV series
    pub source: PriceSeries,

    /// RSI over 14 bars (Wilder smoothing)
    pub rsi_14: Vec<Option<f64>>,
    /// MACD line (EMA12 - EMA26)
    pub macd: Vec<Option<f64>>,
    /// MACD signal line (EMA9 of the MACD line)
    pub macd_signal: Vec<Option<f64>>,
    /// MACD histogram (line - signal)
    pub macd_hist: Vec<Option<f64>>,

    /// 20-bar exponential moving average of close
    pub ema_20: Vec<Option<f64>>,
    /// 50-bar simple moving average of close
    pub sma_50: Vec<Option<f64>>,
    /// 200-bar simple moving average of close
    pub sma_200: Vec<Option<f64>>,

    /// Bollinger middle band (SMA20)
    pub bb_middle: Vec<Option<f64>>,
    /// Bollinger upper band (middle + 2 sigma)
    pub bb_upper: Vec<Option<f64>>,
    /// Bollinger lower band (middle - 2 sigma)
    pub bb_lower: Vec<Option<f64>>,
    /// Band width: (upper - lower) / middle
    pub bb_width: Vec<Option<f64>>,

    /// 1-bar percent change of close
    pub ret_1d: Vec<Option<f64>>,
    /// 5-bar percent change of close
    pub ret_5d: Vec<Option<f64>>,
    /// 20-bar percent change of close
    pub ret_20d: Vec<Option<f64>>,

    /// 5-bar rolling mean of volume
    pub vol_5d_avg: Vec<Option<f64>>,
    /// 1 when volume > 1.5x the defined 5-bar average, else 0
    pub vol_spike: Vec<u8>,
}

impl IndicatorSeries {
    /// Number of rows (same as the source series)
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Check if the series has no rows
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Ticker of the underlying series
    pub fn ticker(&self) -> &str {
        &self.source.ticker
    }

    /// Snapshot of the most recent row, or `None` for an empty series.
    pub fn latest(&self) -> Option<IndicatorRow> {
        let idx = self.len().checked_sub(1)?;
        let bar = &self.source.bars[idx];

        Some(IndicatorRow {
            date: bar.date,
            close: present(Some(bar.close)),
            rsi_14: present(self.rsi_14[idx]),
            macd_hist: present(self.macd_hist[idx]),
            sma_50: present(self.sma_50[idx]),
            sma_200: present(self.sma_200[idx]),
            vol_spike: self.vol_spike[idx],
        })
    }
}

/// Normalize stored values so a NaN reads as missing downstream.
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

// ============================================================================
// Indicator Row
// ============================================================================

/// Snapshot of the latest row of an [`IndicatorSeries`].
///
/// Fields the screener reads, as explicit optionals: a field is `None` both
/// when its window never filled and when the stored value was NaN, so rule
/// evaluation and scoring can apply their different missing-value policies
/// without probing a generic map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    /// Row date
    pub date: NaiveDate,
    /// Latest close
    pub close: Option<f64>,
    /// RSI_14
    pub rsi_14: Option<f64>,
    /// MACD histogram
    pub macd_hist: Option<f64>,
    /// SMA_50
    pub sma_50: Option<f64>,
    /// SMA_200
    pub sma_200: Option<f64>,
    /// Volume spike flag (0 or 1, never missing)
    pub vol_spike: u8,
}

impl IndicatorRow {
    /// A row with every optional field missing (used in tests and as the
    /// scoring baseline).
    pub fn missing(date: NaiveDate) -> Self {
        Self {
            date,
            close: None,
            rsi_14: None,
            macd_hist: None,
            sma_50: None,
            sma_200: None,
            vol_spike: 0,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
