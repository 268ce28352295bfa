//! Rule evaluation and scoring for the latest indicator row.
//!
//! Each rule fires independently against the most recent row of a ticker's
//! indicator series. The two missing-value policies are intentionally
//! different and must stay that way for behavioral compatibility:
//! - signaling: a missing required field silences that rule;
//! - scoring: a missing field compares as 0, so the bonus simply never lands.

use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorRow;

// ============================================================================
// Thresholds
// ============================================================================

/// RSI at or below this is oversold
pub const RSI_OVERSOLD: f64 = 30.0;
/// RSI at or above this is overbought
pub const RSI_OVERBOUGHT: f64 = 70.0;
/// RSI above this earns the momentum score bonus
const RSI_SCORE_THRESHOLD: f64 = 55.0;

/// Baseline score before any bonus
const SCORE_BASE: f64 = 50.0;
/// Bonus for each trend/momentum condition
const SCORE_BONUS: f64 = 10.0;
/// Bonus for a volume spike
const SCORE_VOLUME_BONUS: f64 = 5.0;

// ============================================================================
// Signals
// ============================================================================

/// Signal category; at most one signal per category per evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalCategory {
    /// Oversold/overbought oscillator
    Rsi,
    /// MACD histogram momentum
    Macd,
    /// Close vs 50-bar SMA
    Ma50,
    /// Close vs 200-bar SMA
    Ma200,
    /// Abnormal volume
    Volume,
}

impl std::fmt::Display for SignalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rsi => write!(f, "RSI"),
            Self::Macd => write!(f, "MACD"),
            Self::Ma50 => write!(f, "MA_50"),
            Self::Ma200 => write!(f, "MA_200"),
            Self::Volume => write!(f, "VOLUME"),
        }
    }
}

/// A fired screening signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    /// Rule category
    pub category: SignalCategory,
    /// Human-readable description
    pub description: &'static str,
}

impl Signal {
    fn new(category: SignalCategory, description: &'static str) -> Self {
        Self {
            category,
            description,
        }
    }
}

/// Render fired signals as `"CATEGORY:description"` joined by `", "`.
pub fn format_signals(signals: &[Signal]) -> String {
    signals
        .iter()
        .map(|s| format!("{}:{}", s.category, s.description))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Rule Evaluation
// ============================================================================

/// Evaluate all screening rules against the latest row.
///
/// Returns fired signals in fixed rule order (RSI, MACD, MA_50, MA_200,
/// VOLUME); a missing required field silences only its own rule.
pub fn evaluate_row(row: &IndicatorRow) -> Vec<Signal> {
    let mut signals = Vec::new();

    // RSI band rule; the 30..70 middle is a neutral zone
    if let Some(rsi) = row.rsi_14 {
        if rsi <= RSI_OVERSOLD {
            signals.push(Signal::new(SignalCategory::Rsi, "Oversold (<=30)"));
        } else if rsi >= RSI_OVERBOUGHT {
            signals.push(Signal::new(SignalCategory::Rsi, "Overbought (>=70)"));
        }
    }

    // MACD histogram sign as a momentum proxy; exactly zero is neutral
    if let Some(hist) = row.macd_hist {
        if hist > 0.0 {
            signals.push(Signal::new(SignalCategory::Macd, "Bullish momentum (hist > 0)"));
        } else if hist < 0.0 {
            signals.push(Signal::new(SignalCategory::Macd, "Bearish momentum (hist < 0)"));
        }
    }

    // MA rules have no neutral zone: with both inputs present one of the two
    // labels always fires
    if let (Some(close), Some(sma50)) = (row.close, row.sma_50) {
        if close > sma50 {
            signals.push(Signal::new(SignalCategory::Ma50, "Above 50SMA (uptrend bias)"));
        } else {
            signals.push(Signal::new(SignalCategory::Ma50, "Below 50SMA (weakness)"));
        }
    }

    if let (Some(close), Some(sma200)) = (row.close, row.sma_200) {
        if close > sma200 {
            signals.push(Signal::new(
                SignalCategory::Ma200,
                "Above 200SMA (long-term uptrend)",
            ));
        } else {
            signals.push(Signal::new(
                SignalCategory::Ma200,
                "Below 200SMA (long-term weakness)",
            ));
        }
    }

    // No-spike emits nothing; it is not a negative signal
    if row.vol_spike == 1 {
        signals.push(Signal::new(
            SignalCategory::Volume,
            "Volume spike (>1.5x 5D avg)",
        ));
    }

    signals
}

// ============================================================================
// Scoring
// ============================================================================

/// Score the latest row on a 0-100 scale.
///
/// Base 50 plus fixed bonuses for bullish momentum and trend conditions.
/// Missing fields are read as 0 here (scoring policy), unlike rule
/// evaluation where they silence the rule.
pub fn score_row(row: &IndicatorRow) -> f64 {
    let field = |v: Option<f64>| v.unwrap_or(0.0);
    let mut score = SCORE_BASE;

    if field(row.macd_hist) > 0.0 {
        score += SCORE_BONUS;
    }
    if field(row.rsi_14) > RSI_SCORE_THRESHOLD {
        score += SCORE_BONUS;
    }
    if field(row.close) > field(row.sma_50) {
        score += SCORE_BONUS;
    }
    if field(row.close) > field(row.sma_200) {
        score += SCORE_BONUS;
    }
    if row.vol_spike == 1 {
        score += SCORE_VOLUME_BONUS;
    }

    score.clamp(0.0, 100.0)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn base_row() -> IndicatorRow {
        IndicatorRow::missing(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap())
    }

    fn find(signals: &[Signal], category: SignalCategory) -> Option<&Signal> {
        signals.iter().find(|s| s.category == category)
    }

    #[test]
    fn test_rsi_boundaries() {
        let mut row = base_row();

        row.rsi_14 = Some(30.0);
        let s = evaluate_row(&row);
        assert_eq!(find(&s, SignalCategory::Rsi).unwrap().description, "Oversold (<=30)");

        row.rsi_14 = Some(70.0);
        let s = evaluate_row(&row);
        assert_eq!(
            find(&s, SignalCategory::Rsi).unwrap().description,
            "Overbought (>=70)"
        );

        row.rsi_14 = Some(50.0);
        assert!(find(&evaluate_row(&row), SignalCategory::Rsi).is_none());

        row.rsi_14 = None;
        assert!(find(&evaluate_row(&row), SignalCategory::Rsi).is_none());
    }

    #[test]
    fn test_macd_zero_is_neutral() {
        let mut row = base_row();

        row.macd_hist = Some(0.0);
        assert!(find(&evaluate_row(&row), SignalCategory::Macd).is_none());

        row.macd_hist = Some(0.01);
        assert_eq!(
            find(&evaluate_row(&row), SignalCategory::Macd).unwrap().description,
            "Bullish momentum (hist > 0)"
        );

        row.macd_hist = Some(-0.01);
        assert_eq!(
            find(&evaluate_row(&row), SignalCategory::Macd).unwrap().description,
            "Bearish momentum (hist < 0)"
        );
    }

    #[test]
    fn test_ma_rules_always_label_when_present() {
        let mut row = base_row();
        row.close = Some(100.0);
        row.sma_50 = Some(100.0); // equal counts as weakness, not neutral
        row.sma_200 = Some(90.0);

        let s = evaluate_row(&row);
        assert_eq!(
            find(&s, SignalCategory::Ma50).unwrap().description,
            "Below 50SMA (weakness)"
        );
        assert_eq!(
            find(&s, SignalCategory::Ma200).unwrap().description,
            "Above 200SMA (long-term uptrend)"
        );
    }

    #[test]
    fn test_ma_rules_silent_when_missing() {
        let mut row = base_row();
        row.close = Some(100.0);
        // Both SMAs missing -> both MA rules silent
        let s = evaluate_row(&row);
        assert!(find(&s, SignalCategory::Ma50).is_none());
        assert!(find(&s, SignalCategory::Ma200).is_none());

        // Close missing silences them too
        row.close = None;
        row.sma_50 = Some(90.0);
        assert!(find(&evaluate_row(&row), SignalCategory::Ma50).is_none());
    }

    #[test]
    fn test_volume_rule_one_sided() {
        let mut row = base_row();
        row.vol_spike = 0;
        assert!(find(&evaluate_row(&row), SignalCategory::Volume).is_none());

        row.vol_spike = 1;
        assert_eq!(
            find(&evaluate_row(&row), SignalCategory::Volume).unwrap().description,
            "Volume spike (>1.5x 5D avg)"
        );
    }

    #[test]
    fn test_at_most_one_signal_per_category() {
        let mut row = base_row();
        row.close = Some(110.0);
        row.rsi_14 = Some(75.0);
        row.macd_hist = Some(1.0);
        row.sma_50 = Some(100.0);
        row.sma_200 = Some(90.0);
        row.vol_spike = 1;

        let signals = evaluate_row(&row);
        assert_eq!(signals.len(), 5);
        let mut categories: Vec<_> = signals.iter().map(|s| s.category).collect();
        categories.dedup();
        assert_eq!(categories.len(), 5);
    }

    #[test]
    fn test_score_all_missing_is_base() {
        assert!((score_row(&base_row()) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_full_house() {
        let mut row = base_row();
        row.close = Some(110.0);
        row.sma_50 = Some(100.0);
        row.sma_200 = Some(90.0);
        row.rsi_14 = Some(60.0);
        row.macd_hist = Some(1.0);
        row.vol_spike = 1;

        assert!((score_row(&row) - 95.0).abs() < 1e-9);

        // And all five categories fire their positive branch
        let signals = evaluate_row(&row);
        assert_eq!(signals.len(), 4); // RSI 60 is in the neutral band
        row.rsi_14 = Some(75.0);
        assert_eq!(evaluate_row(&row).len(), 5);
    }

    #[test]
    fn test_score_missing_reads_as_zero() {
        let mut row = base_row();
        // Close present but both MAs missing: 110 > 0 twice
        row.close = Some(110.0);
        assert!((score_row(&row) - 70.0).abs() < 1e-9);

        // RSI missing -> no momentum bonus even though the rule would also
        // be silent; the policies agree here but for different reasons
        row.rsi_14 = None;
        row.macd_hist = Some(-1.0);
        assert!((score_row(&row) - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_bounds() {
        let mut row = base_row();
        row.close = Some(1.0);
        row.sma_50 = Some(100.0);
        row.sma_200 = Some(100.0);
        row.rsi_14 = Some(10.0);
        row.macd_hist = Some(-5.0);
        let score = score_row(&row);
        assert!((0.0..=100.0).contains(&score));
        assert!((score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_evaluate_row_is_pure() {
        let mut row = base_row();
        row.close = Some(110.0);
        row.sma_50 = Some(100.0);
        row.rsi_14 = Some(72.0);

        assert_eq!(evaluate_row(&row), evaluate_row(&row));
        assert_eq!(score_row(&row), score_row(&row));
    }

    #[test]
    fn test_format_signals() {
        let mut row = base_row();
        row.close = Some(110.0);
        row.sma_50 = Some(100.0);
        row.vol_spike = 1;

        let rendered = format_signals(&evaluate_row(&row));
        assert_eq!(
            rendered,
            "MA_50:Above 50SMA (uptrend bias), VOLUME:Volume spike (>1.5x 5D avg)"
        );
        assert_eq!(format_signals(&[]), "");
    }
}
