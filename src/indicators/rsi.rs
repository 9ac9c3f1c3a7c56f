// =============================================================================
// Relative Strength Index (RSI)
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — Split into gains max(delta, 0) and losses max(-delta, 0).
// Step 3 — Average gains / losses over `period` deltas, either with a simple
//          rolling mean or with Wilder's smoothing:
//            avg = (prev_avg * (period - 1) + current) / period
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// A window with no losses is reported as RSI = 100, including a perfectly
// flat window.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::Series;

/// How average gain / average loss are formed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiSmoothing {
    /// Simple rolling mean of the last `period` gains / losses.
    #[default]
    Simple,
    /// Seeded with the simple mean of the first `period` deltas, then
    /// exponentially smoothed with weight `1 / period`.
    Wilder,
}

/// Compute the RSI series for `closes`, aligned with the input.
///
/// The first defined value is at index `period` (it needs `period` deltas);
/// every earlier entry is `None`.
///
/// # Edge cases
/// - `period == 0` => every entry `None`
/// - `closes.len() <= period` => every entry `None`, even for `usize::MAX`
/// - A non-finite close makes the rows whose window contains it undefined
///   (for Wilder smoothing, every row after it).
pub fn calculate_rsi(closes: &[f64], period: usize, smoothing: RsiSmoothing) -> Series {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }

    // --- Split deltas into gains and losses -----------------------------------
    // deltas[j] is the change from close j to close j + 1.
    let (gains, losses): (Vec<f64>, Vec<f64>) =
        closes.windows(2).map(|w| split_delta(w[1] - w[0])).unzip();

    let period_f = period as f64;

    match smoothing {
        RsiSmoothing::Simple => {
            for (j, (g, l)) in gains.windows(period).zip(losses.windows(period)).enumerate() {
                let avg_gain = g.iter().sum::<f64>() / period_f;
                let avg_loss = l.iter().sum::<f64>() / period_f;
                out[j + period] = rsi_from_averages(avg_gain, avg_loss);
            }
        }
        RsiSmoothing::Wilder => {
            let mut avg_gain = gains[..period].iter().sum::<f64>() / period_f;
            let mut avg_loss = losses[..period].iter().sum::<f64>() / period_f;
            out[period] = rsi_from_averages(avg_gain, avg_loss);

            for (j, (&gain, &loss)) in gains.iter().zip(&losses).enumerate().skip(period) {
                avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
                avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;
                match rsi_from_averages(avg_gain, avg_loss) {
                    Some(rsi) => out[j + 1] = Some(rsi),
                    None => break,
                }
            }
        }
    }

    out
}

// =============================================================================
// Internal helpers
// =============================================================================

fn split_delta(delta: f64) -> (f64, f64) {
    if delta.is_nan() {
        (f64::NAN, f64::NAN)
    } else if delta > 0.0 {
        (delta, 0.0)
    } else {
        (0.0, -delta)
    }
}

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// - If average loss is zero, RSI is 100.0.
/// - Returns `None` when either average is non-finite.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if !avg_gain.is_finite() || !avg_loss.is_finite() {
        return None;
    }
    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some((100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0))
}
