// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators behind the bounce
// signal. Every public function returns a series index-aligned with its input:
// one `Option<f64>` per bar, `None` wherever the value is undefined
// (insufficient history or a non-finite intermediate result). Undefined is
// never reported as zero.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod returns;
pub mod rolling;
pub mod rsi;

use serde::{Deserialize, Serialize};

use crate::types::input;

/// An index-aligned indicator column.
pub type Series = Vec<Option<f64>>;

/// Output column names appended by the engine.
pub mod columns {
    pub const SMA: &str = "sma";
    pub const STD: &str = "std";
    pub const BB_UPPER: &str = "bb_upper";
    pub const BB_LOWER: &str = "bb_lower";
    pub const RSI: &str = "rsi";
    pub const MACD: &str = "macd";
    pub const MACD_SIGNAL: &str = "macd_signal";
    pub const MACD_HIST: &str = "macd_hist";
    pub const EMA_FAST: &str = "ema_fast";
    pub const EMA_SLOW: &str = "ema_slow";
    pub const MA: &str = "ma";
    pub const VOLUME_MA: &str = "volume_ma";
    pub const PRICE_CHANGE: &str = "price_change";
    pub const BOUNCE_SIGNAL: &str = "bounce_signal";
}

/// The independently computable indicator groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    /// `sma`, `std`, `bb_upper`, `bb_lower` over Close.
    Bollinger,
    /// `rsi` over Close.
    Rsi,
    /// `macd`, `macd_signal`, `macd_hist` over Close.
    Macd,
    /// `ema_fast`, `ema_slow` trend pair over Close.
    EmaTrend,
    /// `ma`, the crossover moving average over Close.
    MovingAverage,
    /// `volume_ma` over Volume.
    VolumeMa,
    /// `price_change`, the one-bar fractional return of Close.
    PriceChange,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 7] = [
        IndicatorKind::Bollinger,
        IndicatorKind::Rsi,
        IndicatorKind::Macd,
        IndicatorKind::EmaTrend,
        IndicatorKind::MovingAverage,
        IndicatorKind::VolumeMa,
        IndicatorKind::PriceChange,
    ];

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::Bollinger => &[columns::SMA, columns::STD, columns::BB_UPPER, columns::BB_LOWER],
            Self::Rsi => &[columns::RSI],
            Self::Macd => &[columns::MACD, columns::MACD_SIGNAL, columns::MACD_HIST],
            Self::EmaTrend => &[columns::EMA_FAST, columns::EMA_SLOW],
            Self::MovingAverage => &[columns::MA],
            Self::VolumeMa => &[columns::VOLUME_MA],
            Self::PriceChange => &[columns::PRICE_CHANGE],
        }
    }

    /// Input columns beyond Close that this indicator reads.
    pub fn required_inputs(&self) -> &'static [&'static str] {
        match self {
            Self::VolumeMa => &[input::VOLUME],
            _ => &[],
        }
    }
}

impl std::fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bollinger => write!(f, "bollinger"),
            Self::Rsi => write!(f, "rsi"),
            Self::Macd => write!(f, "macd"),
            Self::EmaTrend => write!(f, "ema_trend"),
            Self::MovingAverage => write!(f, "moving_average"),
            Self::VolumeMa => write!(f, "volume_ma"),
            Self::PriceChange => write!(f, "price_change"),
        }
    }
}

/// `Some(value)` when finite, `None` otherwise.
pub(crate) fn defined(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}
