// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_t      = value_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The first EMA value is seeded with the SMA of the first `period` defined
// values, and sits at the last of those values. Entries before the seed are
// undefined.
// =============================================================================

use super::Series;

/// Compute the EMA series for `closes`, aligned with the input.
///
/// The first defined value is at index `period - 1`.
///
/// # Edge cases
/// - `period == 0` => every entry `None`
/// - `closes.len() < period` => every entry `None`
/// - A non-finite value stops the series; every later entry is `None`.
pub fn calculate_ema(closes: &[f64], period: usize) -> Series {
    let values: Series = closes.iter().map(|&c| Some(c)).collect();
    ema_over(&values, period)
}

/// EMA over a series that may itself start with an undefined prefix (such as
/// the MACD line). The leading `None`s are skipped and the seed is the SMA of
/// the first `period` values after them.
pub fn ema_over(values: &[Option<f64>], period: usize) -> Series {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    let Some(start) = values.iter().position(Option::is_some) else {
        return out;
    };
    let seed_end = match start.checked_add(period) {
        Some(end) if end <= values.len() => end,
        _ => return out,
    };

    // Seed: SMA of the first `period` defined values.
    let mut sum = 0.0;
    for value in &values[start..seed_end] {
        match value {
            Some(v) if v.is_finite() => sum += v,
            _ => return out,
        }
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut prev_ema = sum / period as f64;
    out[seed_end - 1] = Some(prev_ema);

    for (i, value) in values.iter().enumerate().skip(seed_end) {
        let Some(v) = *value else { break };
        let ema = v * multiplier + prev_ema * (1.0 - multiplier);
        if !ema.is_finite() {
            break;
        }
        out[i] = Some(ema);
        prev_ema = ema;
    }

    out
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    // ---- calculate_ema ---------------------------------------------------

    #[test]
    fn ema_empty_input() {
        assert!(calculate_ema(&[], 5).is_empty());
    }

    #[test]
    fn ema_period_zero() {
        assert!(calculate_ema(&[1.0, 2.0, 3.0], 0).iter().all(Option::is_none));
    }

    #[test]
    fn ema_insufficient_data() {
        let ema = calculate_ema(&[1.0, 2.0], 5);
        assert_eq!(ema, vec![None, None]);
    }

    #[test]
    fn ema_period_equals_length() {
        let ema = calculate_ema(&[2.0, 4.0, 6.0], 3);
        assert_eq!(ema.len(), 3);
        // Should be the SMA = (2+4+6)/3 = 4.0
        assert!((ema[2].unwrap() - 4.0).abs() < 1e-10);
        assert_eq!(ema[1], None);
    }

    #[test]
    fn ema_known_values() {
        // 5-period EMA of [1,2,3,4,5,6,7,8,9,10]
        // SMA of first 5 = 3.0, multiplier = 2/6 = 1/3
        let closes: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let ema = calculate_ema(&closes, 5);
        assert_eq!(ema.len(), 10);
        assert!(ema[..4].iter().all(Option::is_none));

        let mult = 2.0 / 6.0;
        let mut expected = 3.0;
        assert!((ema[4].unwrap() - expected).abs() < 1e-10);
        for (i, &c) in closes.iter().enumerate().skip(5) {
            expected = c * mult + expected * (1.0 - mult);
            let got = ema[i].unwrap();
            assert!((got - expected).abs() < 1e-10, "got {got}, expected {expected}");
        }
    }

    #[test]
    fn ema_handles_nan_in_input() {
        let ema = calculate_ema(&[1.0, 2.0, 3.0, f64::NAN, 5.0], 3);
        // Seed at index 2, then NaN breaks the series.
        assert_eq!(ema, vec![None, None, Some(2.0), None, None]);
    }

    // ---- ema_over --------------------------------------------------------

    #[test]
    fn ema_over_skips_leading_undefined() {
        let values = vec![None, None, Some(2.0), Some(4.0), Some(6.0), Some(8.0)];
        let ema = ema_over(&values, 2);
        assert_eq!(&ema[..3], &[None, None, None]);
        // Seed = mean(2, 4) = 3 at index 3; multiplier 2/3.
        assert!((ema[3].unwrap() - 3.0).abs() < 1e-10);
        assert!((ema[4].unwrap() - (6.0 * 2.0 / 3.0 + 3.0 / 3.0)).abs() < 1e-10);
    }

    #[test]
    fn ema_period_longer_than_any_series() {
        assert_eq!(calculate_ema(&[1.0, 2.0, 3.0], usize::MAX), vec![None; 3]);
        let values = [None, Some(1.0), Some(2.0)];
        assert_eq!(ema_over(&values, usize::MAX), vec![None; 3]);
    }

    #[test]
    fn ema_over_all_undefined() {
        assert_eq!(ema_over(&[None, None], 1), vec![None, None]);
    }
}
