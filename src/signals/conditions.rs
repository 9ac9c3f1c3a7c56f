// =============================================================================
// Bounce Conditions — per-bar predicates over indicator columns
// =============================================================================
//
// Level conditions compare values on the same bar. Transition conditions
// (support bounce, MA crossover) are a forward scan over (previous, current)
// pairs; row 0 has no previous bar and is always false.
//
// Every comparison treats `None` (and NaN) as "not satisfied".
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::annotated::AnnotatedSeries;
use crate::error::EngineError;
use crate::indicators::{columns, IndicatorKind};
use crate::types::input;

/// One building block of a bounce policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// RSI strictly below `threshold`.
    RsiBelow { threshold: f64 },
    /// Close strictly below the lower Bollinger band.
    CloseBelowLowerBand,
    /// Close at or below `lower_band * tolerance` (1.02 = within 2%).
    CloseNearLowerBand { tolerance: f64 },
    /// MACD line above its signal line (level, not a cross).
    MacdAboveSignal,
    /// Fast trend EMA above slow trend EMA.
    FastEmaAboveSlow,
    /// Previous Low at or below previous lower band, and Close up from the
    /// previous Close.
    SupportBounce,
    /// Close crosses up through the moving average on rising price with
    /// above-average volume.
    MaCrossoverWithVolume,
    /// One-bar return strictly positive.
    PositiveMomentum,
}

impl Condition {
    pub fn required_indicators(&self) -> &'static [IndicatorKind] {
        match self {
            Self::RsiBelow { .. } => &[IndicatorKind::Rsi],
            Self::CloseBelowLowerBand | Self::CloseNearLowerBand { .. } | Self::SupportBounce => {
                &[IndicatorKind::Bollinger]
            }
            Self::MacdAboveSignal => &[IndicatorKind::Macd],
            Self::FastEmaAboveSlow => &[IndicatorKind::EmaTrend],
            Self::MaCrossoverWithVolume => &[
                IndicatorKind::MovingAverage,
                IndicatorKind::PriceChange,
                IndicatorKind::VolumeMa,
            ],
            Self::PositiveMomentum => &[IndicatorKind::PriceChange],
        }
    }

    /// Input columns beyond Close that the rule itself reads.
    pub fn required_inputs(&self) -> &'static [&'static str] {
        match self {
            Self::SupportBounce => &[input::LOW],
            Self::MaCrossoverWithVolume => &[input::VOLUME],
            _ => &[],
        }
    }

    /// Evaluate the condition on every row of `table`.
    ///
    /// Fails when an indicator column the condition needs has not been
    /// computed, or when the series lacks a required input column.
    pub fn evaluate(&self, table: &AnnotatedSeries) -> Result<Vec<bool>, EngineError> {
        let series = table.series();
        let closes = series.closes();

        let hits = match *self {
            Self::RsiBelow { threshold } => below(table.require(columns::RSI)?, threshold),
            Self::CloseBelowLowerBand => {
                close_below_band(closes, table.require(columns::BB_LOWER)?)
            }
            Self::CloseNearLowerBand { tolerance } => {
                close_near_band(closes, table.require(columns::BB_LOWER)?, tolerance)
            }
            Self::MacdAboveSignal => greater_than(
                table.require(columns::MACD)?,
                table.require(columns::MACD_SIGNAL)?,
            ),
            Self::FastEmaAboveSlow => greater_than(
                table.require(columns::EMA_FAST)?,
                table.require(columns::EMA_SLOW)?,
            ),
            Self::SupportBounce => support_bounce(
                series.require(input::LOW)?,
                table.require(columns::BB_LOWER)?,
                closes,
            ),
            Self::MaCrossoverWithVolume => ma_crossover_with_volume(
                closes,
                table.require(columns::MA)?,
                table.require(columns::PRICE_CHANGE)?,
                series.require(input::VOLUME)?,
                table.require(columns::VOLUME_MA)?,
            ),
            Self::PositiveMomentum => above(table.require(columns::PRICE_CHANGE)?, 0.0),
        };
        Ok(hits)
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RsiBelow { threshold } => write!(f, "rsi < {threshold}"),
            Self::CloseBelowLowerBand => write!(f, "close < bb_lower"),
            Self::CloseNearLowerBand { tolerance } => write!(f, "close <= bb_lower * {tolerance}"),
            Self::MacdAboveSignal => write!(f, "macd > macd_signal"),
            Self::FastEmaAboveSlow => write!(f, "ema_fast > ema_slow"),
            Self::SupportBounce => write!(f, "support bounce"),
            Self::MaCrossoverWithVolume => write!(f, "ma crossover with volume"),
            Self::PositiveMomentum => write!(f, "price_change > 0"),
        }
    }
}

/// AND of `conditions` on every row. An empty set never fires.
pub fn evaluate_all(
    conditions: &[Condition],
    table: &AnnotatedSeries,
) -> Result<Vec<bool>, EngineError> {
    if conditions.is_empty() {
        return Ok(vec![false; table.len()]);
    }

    let mut combined = vec![true; table.len()];
    for condition in conditions {
        let hits = condition.evaluate(table)?;
        for (acc, hit) in combined.iter_mut().zip(hits) {
            *acc &= hit;
        }
    }
    Ok(combined)
}

// =============================================================================
// Predicates
// =============================================================================

pub fn below(values: &[Option<f64>], threshold: f64) -> Vec<bool> {
    values
        .iter()
        .map(|v| matches!(v, Some(x) if *x < threshold))
        .collect()
}

pub fn above(values: &[Option<f64>], threshold: f64) -> Vec<bool> {
    values
        .iter()
        .map(|v| matches!(v, Some(x) if *x > threshold))
        .collect()
}

pub fn greater_than(lhs: &[Option<f64>], rhs: &[Option<f64>]) -> Vec<bool> {
    lhs.iter()
        .zip(rhs)
        .map(|pair| matches!(pair, (Some(a), Some(b)) if a > b))
        .collect()
}

pub fn close_below_band(closes: &[f64], band: &[Option<f64>]) -> Vec<bool> {
    closes
        .iter()
        .zip(band)
        .map(|(close, band)| matches!(band, Some(b) if *close < *b))
        .collect()
}

pub fn close_near_band(closes: &[f64], band: &[Option<f64>], tolerance: f64) -> Vec<bool> {
    closes
        .iter()
        .zip(band)
        .map(|(close, band)| matches!(band, Some(b) if *close <= *b * tolerance))
        .collect()
}

/// `low[t-1] <= lower[t-1] && close[t] > close[t-1]`.
pub fn support_bounce(lows: &[f64], lower: &[Option<f64>], closes: &[f64]) -> Vec<bool> {
    pairwise(closes.len(), |prev, cur| {
        matches!(lower[prev], Some(band) if lows[prev] <= band) && closes[cur] > closes[prev]
    })
}

/// `close[t-1] < ma[t-1] && close[t] >= ma[t] && change[t] > 0 && volume[t] > volume_ma[t]`.
pub fn ma_crossover_with_volume(
    closes: &[f64],
    ma: &[Option<f64>],
    price_change: &[Option<f64>],
    volumes: &[f64],
    volume_ma: &[Option<f64>],
) -> Vec<bool> {
    pairwise(closes.len(), |prev, cur| {
        match (ma[prev], ma[cur], price_change[cur], volume_ma[cur]) {
            (Some(prev_ma), Some(cur_ma), Some(change), Some(avg_volume)) => {
                closes[prev] < prev_ma
                    && closes[cur] >= cur_ma
                    && change > 0.0
                    && volumes[cur] > avg_volume
            }
            _ => false,
        }
    })
}

/// Row 0 is false; row `t` is `rule(t - 1, t)`.
fn pairwise(len: usize, rule: impl Fn(usize, usize) -> bool) -> Vec<bool> {
    std::iter::once(false)
        .take(len)
        .chain((1..len).map(|cur| rule(cur - 1, cur)))
        .collect()
}
