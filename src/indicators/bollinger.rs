// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the rolling *sample* standard
// deviation over the same window.
//
// `k` is assumed non-negative (enforced by config validation), which gives
// `lower <= middle <= upper` on every defined row.

use super::rolling::{rolling_std, sma};
use super::Series;

/// Band levels for one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBand {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Index-aligned Bollinger columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BollingerSeries {
    pub middle: Series,
    pub std: Series,
    pub upper: Series,
    pub lower: Series,
}

impl BollingerSeries {
    /// Band levels at `index`, if every band is defined there.
    pub fn at(&self, index: usize) -> Option<BollingerBand> {
        Some(BollingerBand {
            upper: (*self.upper.get(index)?)?,
            middle: (*self.middle.get(index)?)?,
            lower: (*self.lower.get(index)?)?,
        })
    }
}

/// Calculate Bollinger Bands for the given closing prices.
///
/// A band row is defined only where both the SMA and the sample standard
/// deviation are defined, so `period < 2` or `closes.len() < period` gives an
/// entirely undefined result rather than an error.
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> BollingerSeries {
    let middle = sma(closes, period);
    let std = rolling_std(closes, period);

    let band = |sign: f64| -> Series {
        middle
            .iter()
            .zip(&std)
            .map(|(m, s)| match (m, s) {
                (Some(m), Some(s)) => super::defined(m + sign * num_std * s),
                _ => None,
            })
            .collect()
    };
    let upper = band(1.0);
    let lower = band(-1.0);

    BollingerSeries {
        middle,
        std,
        upper,
        lower,
    }
}
