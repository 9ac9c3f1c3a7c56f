// =============================================================================
// Rolling Window Statistics
// =============================================================================
//
// Simple moving average and sample standard deviation over a fixed window.
// Each window is summed directly (O(n * window)); the value at index
// `window - 1` is exactly the mean of rows `[0, window - 1]`.
// =============================================================================

use super::{defined, Series};

/// Simple moving average of the last `window` values.
///
/// The output has the same length as `values`; the first `window - 1`
/// entries are `None`.
///
/// # Edge cases
/// - `window == 0` => every entry `None`
/// - `values.len() < window` => every entry `None`
/// - A window containing a non-finite value yields `None` for that row.
pub fn sma(values: &[f64], window: usize) -> Series {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    for (i, w) in values.windows(window).enumerate() {
        out[i + window - 1] = defined(w.iter().sum::<f64>() / window as f64);
    }
    out
}

/// Rolling sample standard deviation (N-1 denominator).
///
/// A window of one observation has no sample variance, so `window < 2`
/// yields an entirely undefined series.
pub fn rolling_std(values: &[f64], window: usize) -> Series {
    let mut out = vec![None; values.len()];
    if window < 2 || values.len() < window {
        return out;
    }

    for (i, w) in values.windows(window).enumerate() {
        out[i + window - 1] = sample_std(w);
    }
    out
}

fn sample_std(window: &[f64]) -> Option<f64> {
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    defined(variance.sqrt())
}
