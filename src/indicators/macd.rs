// =============================================================================
// MACD (Moving Average Convergence Divergence)
// =============================================================================
//
//   MACD      = EMA(fast) - EMA(slow)
//   Signal    = EMA(signal) of MACD
//   Histogram = MACD - Signal
//
// The MACD line is defined from index `max(fast, slow) - 1`; the signal line
// needs a further `signal - 1` bars to seed.

use super::ema::{calculate_ema, ema_over};
use super::Series;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdSeries {
    pub macd: Series,
    pub signal: Series,
    pub histogram: Series,
}

pub fn calculate_macd(
    closes: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> MacdSeries {
    let fast = calculate_ema(closes, fast_period);
    let slow = calculate_ema(closes, slow_period);

    let macd = difference(&fast, &slow);
    let signal = ema_over(&macd, signal_period);
    let histogram = difference(&macd, &signal);

    MacdSeries {
        macd,
        signal,
        histogram,
    }
}

fn difference(lhs: &[Option<f64>], rhs: &[Option<f64>]) -> Series {
    lhs.iter()
        .zip(rhs)
        .map(|(a, b)| Some((*a)? - (*b)?))
        .collect()
}
