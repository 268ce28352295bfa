//! Rolling-window primitives for indicator computation.
//!
//! All functions return a vector index-aligned with the input; positions
//! without enough trailing history are `None`, never a sentinel number.
//! NaN inputs propagate through the arithmetic the same way they do through
//! the source columns.

/// Simple moving average over a trailing window.
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    debug_assert!(window >= 1);
    let mut out = vec![None; values.len()];

    for i in (window - 1)..values.len() {
        let slice = &values[i + 1 - window..=i];
        out[i] = Some(slice.iter().sum::<f64>() / window as f64);
    }

    out
}

/// Rolling population standard deviation (ddof = 0) over a trailing window.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    debug_assert!(window >= 1);
    let mut out = vec![None; values.len()];

    for i in (window - 1)..values.len() {
        let slice = &values[i + 1 - window..=i];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let var = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / window as f64;
        out[i] = Some(var.sqrt());
    }

    out
}

/// Exponential moving average, seeded with the SMA of the first full window.
///
/// Smoothing factor is the standard 2 / (window + 1); values before the seed
/// index are `None`.
pub fn ema(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let wrapped: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
    ema_opt(&wrapped, window)
}

/// EMA over a partially-defined series.
///
/// The window starts at the first defined input; earlier positions stay
/// `None`. Used to chain EMAs (e.g., the MACD signal line over the MACD
/// line, which is itself undefined early on).
pub fn ema_opt(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    debug_assert!(window >= 1);
    let mut out = vec![None; values.len()];

    let first_defined = match values.iter().position(|v| v.is_some()) {
        Some(idx) => idx,
        None => return out,
    };
    let seed_idx = first_defined + window - 1;
    if seed_idx >= values.len() {
        return out;
    }

    let seed: f64 = values[first_defined..=seed_idx]
        .iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .sum::<f64>()
        / window as f64;
    out[seed_idx] = Some(seed);

    let alpha = 2.0 / (window as f64 + 1.0);
    let mut prev = seed;
    for i in (seed_idx + 1)..values.len() {
        let current = values[i].unwrap_or(f64::NAN);
        prev = alpha * current + (1.0 - alpha) * prev;
        out[i] = Some(prev);
    }

    out
}

/// Percent change over `periods` bars: (x[i] - x[i-n]) / x[i-n].
pub fn pct_change(values: &[f64], periods: usize) -> Vec<Option<f64>> {
    debug_assert!(periods >= 1);
    let mut out = vec![None; values.len()];

    for i in periods..values.len() {
        let prev = values[i - periods];
        out[i] = Some((values[i] - prev) / prev);
    }

    out
}

/// Relative Strength Index with Wilder smoothing.
///
/// The first defined value sits at index `period` (one price change per bar,
/// `period` changes needed); the seed averages are plain means of the first
/// `period` gains/losses, smoothed with alpha = 1/period afterwards.
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    debug_assert!(period >= 1);
    let n = closes.len();
    let mut out = vec![None; n];
    if n <= period {
        return out;
    }

    let mut gains = vec![0.0; n];
    let mut losses = vec![0.0; n];
    for i in 1..n {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            gains[i] = change;
        } else {
            losses[i] = -change;
        }
    }

    let mut avg_gain: f64 = gains[1..=period].iter().sum::<f64>() / period as f64;
    let mut avg_loss: f64 = losses[1..=period].iter().sum::<f64>() / period as f64;
    out[period] = Some(rsi_value(avg_gain, avg_loss));

    let alpha = 1.0 / period as f64;
    for i in (period + 1)..n {
        avg_gain = alpha * gains[i] + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * losses[i] + (1.0 - alpha) * avg_loss;
        out[i] = Some(rsi_value(avg_gain, avg_loss));
    }

    out
}

/// RSI from average gain/loss, with the flat-market edge cases pinned:
/// no losses -> 100, no gains -> 0, neither -> 50.
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        if avg_gain <= 0.0 {
            50.0
        } else {
            100.0
        }
    } else if avg_gain <= 0.0 {
        0.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }
}

/// MACD line, signal line, and histogram.
///
/// Line = EMA(fast) - EMA(slow); signal = EMA(signal_window) of the line;
/// histogram = line - signal. Each is defined only where its inputs are.
pub fn macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_window: usize,
) -> (Vec<Option<f64>>, Vec<Option<f64>>, Vec<Option<f64>>) {
    let ema_fast = ema(closes, fast);
    let ema_slow = ema(closes, slow);

    let line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let signal = ema_opt(&line, signal_window);

    let hist: Vec<Option<f64>> = line
        .iter()
        .zip(&signal)
        .map(|(l, s)| match (l, s) {
            (Some(l), Some(s)) => Some(l - s),
            _ => None,
        })
        .collect();

    (line, signal, hist)
}

// ============================================================================
// Tests
// ============================================================================
