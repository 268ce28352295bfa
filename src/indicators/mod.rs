//! Indicator engine.
//!
//! A pure transform from a raw OHLCV series to the same series augmented
//! with derived columns: momentum (RSI, MACD, returns), trend (EMA/SMA),
//! volatility (Bollinger bands), and volume anomaly (5-bar average + spike
//! flag). Rows without enough trailing history carry `None`, never zero;
//! repeated calls over identical input produce identical output.

pub mod math;
mod series;

pub use series::{IndicatorRow, IndicatorSeries};

use crate::data::PriceSeries;

// ============================================================================
// Window Constants
// ============================================================================

/// RSI lookback
pub const RSI_PERIOD: usize = 14;
/// MACD fast EMA window
pub const MACD_FAST: usize = 12;
/// MACD slow EMA window
pub const MACD_SLOW: usize = 26;
/// MACD signal EMA window
pub const MACD_SIGNAL: usize = 9;
/// EMA trend window
pub const EMA_PERIOD: usize = 20;
/// Short SMA trend window
pub const SMA_SHORT: usize = 50;
/// Long SMA trend window
pub const SMA_LONG: usize = 200;
/// Bollinger band window
pub const BB_WINDOW: usize = 20;
/// Bollinger band width in standard deviations
pub const BB_NUM_STD: f64 = 2.0;
/// Volume rolling-average window
pub const VOL_WINDOW: usize = 5;
/// Volume spike threshold as a multiple of the rolling average
pub const VOL_SPIKE_RATIO: f64 = 1.5;

// ============================================================================
// Engine
// ============================================================================

/// Compute all derived indicator columns for a price series.
///
/// An empty series yields an empty, shape-preserving result; this is not an
/// error condition.
pub fn compute(source: &PriceSeries) -> IndicatorSeries {
    let closes = source.closes();
    let volumes = source.volumes();

    let (macd, macd_signal, macd_hist) = math::macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);

    let bb_middle = math::sma(&closes, BB_WINDOW);
    let bb_std = math::rolling_std(&closes, BB_WINDOW);
    let (bb_upper, bb_lower, bb_width) = bollinger_bands(&bb_middle, &bb_std);

    let vol_5d_avg = math::sma(&volumes, VOL_WINDOW);
    let vol_spike = volume_spikes(&volumes, &vol_5d_avg);

    IndicatorSeries {
        source: source.clone(),
        rsi_14: math::rsi(&closes, RSI_PERIOD),
        macd,
        macd_signal,
        macd_hist,
        ema_20: math::ema(&closes, EMA_PERIOD),
        sma_50: math::sma(&closes, SMA_SHORT),
        sma_200: math::sma(&closes, SMA_LONG),
        bb_middle,
        bb_upper,
        bb_lower,
        bb_width,
        ret_1d: math::pct_change(&closes, 1),
        ret_5d: math::pct_change(&closes, 5),
        ret_20d: math::pct_change(&closes, 20),
        vol_5d_avg,
        vol_spike,
    }
}

/// Upper/lower bands at +/- `BB_NUM_STD` sigma and the normalized width.
fn bollinger_bands(
    middle: &[Option<f64>],
    std: &[Option<f64>],
) -> (Vec<Option<f64>>, Vec<Option<f64>>, Vec<Option<f64>>) {
    let mut upper = vec![None; middle.len()];
    let mut lower = vec![None; middle.len()];
    let mut width = vec![None; middle.len()];

    for i in 0..middle.len() {
        if let (Some(m), Some(s)) = (middle[i], std[i]) {
            let u = m + BB_NUM_STD * s;
            let l = m - BB_NUM_STD * s;
            upper[i] = Some(u);
            lower[i] = Some(l);
            width[i] = Some((u - l) / m);
        }
    }

    (upper, lower, width)
}

/// Spike flags: 1 only where the rolling average is defined and volume
/// strictly exceeds `VOL_SPIKE_RATIO` times it. Insufficient history
/// degrades to 0 ("no spike"), not to missing.
fn volume_spikes(volumes: &[f64], rolling_avg: &[Option<f64>]) -> Vec<u8> {
    volumes
        .iter()
        .zip(rolling_avg)
        .map(|(&vol, avg)| match avg {
            Some(avg) if vol > VOL_SPIKE_RATIO * avg => 1,
            _ => 0,
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Bar, Interval, PriceSeries};
    use chrono::NaiveDate;

    fn make_series(closes: &[f64], volumes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let bars = closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&close, &volume))| Bar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume,
            })
            .collect();
        PriceSeries::new("TEST", Interval::Daily, bars)
    }

    fn trending_series(n: usize) -> PriceSeries {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64 * 0.3).collect();
        let volumes = vec![1_000_000.0; n];
        make_series(&closes, &volumes)
    }

    /// Convex growth: gains accelerate, so the MACD line keeps rising and
    /// the histogram stays positive (a constant-slope ramp converges to a
    /// flat line and a ~0 histogram instead).
    fn accelerating_series(n: usize) -> PriceSeries {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + (i * i) as f64 * 0.01).collect();
        let volumes = vec![1_000_000.0; n];
        make_series(&closes, &volumes)
    }

    #[test]
    fn test_compute_empty_series() {
        let out = compute(&PriceSeries::empty("TEST", Interval::Daily));
        assert!(out.is_empty());
        assert!(out.rsi_14.is_empty());
        assert!(out.vol_spike.is_empty());
        assert!(out.latest().is_none());
    }

    #[test]
    fn test_compute_preserves_row_count() {
        let series = trending_series(250);
        let out = compute(&series);

        assert_eq!(out.len(), 250);
        for column in [
            &out.rsi_14,
            &out.macd,
            &out.macd_signal,
            &out.macd_hist,
            &out.ema_20,
            &out.sma_50,
            &out.sma_200,
            &out.bb_middle,
            &out.bb_upper,
            &out.bb_lower,
            &out.bb_width,
            &out.ret_1d,
            &out.ret_5d,
            &out.ret_20d,
            &out.vol_5d_avg,
        ] {
            assert_eq!(column.len(), 250);
        }
        assert_eq!(out.vol_spike.len(), 250);
    }

    #[test]
    fn test_warmup_rows_are_missing() {
        let series = trending_series(250);
        let out = compute(&series);

        assert!(out.rsi_14[13].is_none());
        assert!(out.rsi_14[14].is_some());
        assert!(out.sma_50[48].is_none());
        assert!(out.sma_50[49].is_some());
        assert!(out.sma_200[198].is_none());
        assert!(out.sma_200[199].is_some());
        assert!(out.bb_middle[18].is_none());
        assert!(out.bb_middle[19].is_some());
        assert!(out.ret_20d[19].is_none());
        assert!(out.ret_20d[20].is_some());
        // VOL_SPIKE degrades to 0 during warmup instead of going missing
        for i in 0..4 {
            assert_eq!(out.vol_spike[i], 0);
        }
    }

    #[test]
    fn test_short_series_has_no_long_windows() {
        let series = trending_series(30);
        let out = compute(&series);

        assert!(out.sma_50.iter().all(|v| v.is_none()));
        assert!(out.sma_200.iter().all(|v| v.is_none()));
        assert!(out.macd_hist.iter().all(|v| v.is_none()));
        // But the short windows are live
        assert!(out.rsi_14[29].is_some());
        assert!(out.bb_middle[29].is_some());
    }

    #[test]
    fn test_bollinger_relationships() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.5).sin() * 5.0)
            .collect();
        let series = make_series(&closes, &vec![1_000_000.0; 60]);
        let out = compute(&series);

        for i in 19..60 {
            let m = out.bb_middle[i].unwrap();
            let u = out.bb_upper[i].unwrap();
            let l = out.bb_lower[i].unwrap();
            let w = out.bb_width[i].unwrap();
            assert!(u >= m && m >= l);
            assert!((w - (u - l) / m).abs() < 1e-9);
        }
    }

    #[test]
    fn test_volume_spike_threshold_is_strict() {
        let closes = vec![100.0; 10];
        // Flat volume then exactly 1.5x, then above it
        let mut volumes = vec![1000.0; 10];
        volumes[8] = 1500.0; // avg of previous window incl. itself: not strictly above
        volumes[9] = 5000.0;
        let series = make_series(&closes, &volumes);
        let out = compute(&series);

        // Index 8: avg = (1000*4 + 1500)/5 = 1100; 1500 <= 1650 -> no spike
        assert_eq!(out.vol_spike[8], 0);
        // Index 9: avg = (1000*3 + 1500 + 5000)/5 = 1900; 5000 > 2850 -> spike
        assert_eq!(out.vol_spike[9], 1);
    }

    #[test]
    fn test_latest_row_snapshot() {
        let series = accelerating_series(250);
        let out = compute(&series);
        let row = out.latest().unwrap();

        assert!(row.close.is_some());
        assert!(row.rsi_14.is_some());
        assert!(row.sma_50.is_some());
        assert!(row.sma_200.is_some());
        assert!(row.macd_hist.is_some());
        // Accelerating uptrend: close above both MAs, positive histogram
        assert!(row.close.unwrap() > row.sma_50.unwrap());
        assert!(row.sma_50.unwrap() > row.sma_200.unwrap());
        assert!(row.macd_hist.unwrap() > 0.0);
    }

    #[test]
    fn test_compute_is_deterministic() {
        let series = trending_series(120);
        let a = compute(&series);
        let b = compute(&series);

        assert_eq!(a.rsi_14, b.rsi_14);
        assert_eq!(a.macd_hist, b.macd_hist);
        assert_eq!(a.bb_width, b.bb_width);
        assert_eq!(a.vol_spike, b.vol_spike);
    }

    #[test]
    fn test_compute_does_not_mutate_source() {
        let series = trending_series(60);
        let closes_before = series.closes();
        let _ = compute(&series);
        assert_eq!(series.closes(), closes_before);
    }
}
