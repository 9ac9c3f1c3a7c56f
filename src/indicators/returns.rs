// =============================================================================
// Period-over-period Return
// =============================================================================
//
// Fractional change in price over a look-back of `periods` bars:
//   change_t = (close_t - close_{t-n}) / close_{t-n}
//
// Positive values indicate upward momentum; negative indicate downward.

use super::{defined, Series};

/// Fractional price change over `periods` bars, aligned with `closes`.
///
/// The first `periods` entries are `None`. A zero reference price gives an
/// undefined entry rather than an infinite one.
pub fn pct_change(closes: &[f64], periods: usize) -> Series {
    let mut out = vec![None; closes.len()];
    if periods == 0 || closes.len() <= periods {
        return out;
    }

    for i in periods..closes.len() {
        let prev = closes[i - periods];
        if prev != 0.0 {
            out[i] = defined((closes[i] - prev) / prev);
        }
    }
    out
}
