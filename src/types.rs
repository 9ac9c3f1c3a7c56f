// =============================================================================
// Shared types used across the bounce scanner
// =============================================================================
//
// `PriceSeries` is the engine's only input. Close is mandatory; every other
// column is optional and is required only by the indicators or signal rules
// that reference it. Validation happens once, at construction time, so the
// engine can treat every series it receives as well-formed.
// =============================================================================

use chrono::NaiveDate;
use crate::error::EngineError;

/// Names of the input columns, as they appear in bar files and errors.
pub mod input {
    pub const DATE: &str = "Date";
    pub const OPEN: &str = "Open";
    pub const HIGH: &str = "High";
    pub const LOW: &str = "Low";
    pub const CLOSE: &str = "Close";
    pub const VOLUME: &str = "Volume";
}

/// A single daily OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Column-oriented, index-aligned price table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    dates: Option<Vec<NaiveDate>>,
    open: Option<Vec<f64>>,
    high: Option<Vec<f64>>,
    low: Option<Vec<f64>>,
    close: Vec<f64>,
    volume: Option<Vec<f64>>,
}

impl PriceSeries {
    /// A series with zero rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A Close-only series.
    pub fn from_closes(closes: Vec<f64>) -> Self {
        Self {
            close: closes,
            ..Self::default()
        }
    }

    /// Build a full OHLCV series from bars.
    ///
    /// Fails when dates are not strictly increasing or a volume is negative.
    pub fn from_bars(bars: &[Bar]) -> Result<Self, EngineError> {
        Self::from_closes(bars.iter().map(|b| b.close).collect())
            .with_dates(bars.iter().map(|b| b.date).collect())?
            .with_open(bars.iter().map(|b| b.open).collect())?
            .with_high(bars.iter().map(|b| b.high).collect())?
            .with_low(bars.iter().map(|b| b.low).collect())?
            .with_volume(bars.iter().map(|b| b.volume).collect())
    }

    pub fn with_dates(mut self, dates: Vec<NaiveDate>) -> Result<Self, EngineError> {
        self.check_len(input::DATE, dates.len())?;
        if let Some(index) = dates.windows(2).position(|w| w[1] <= w[0]) {
            return Err(EngineError::UnorderedDates { index: index + 1 });
        }
        self.dates = Some(dates);
        Ok(self)
    }

    pub fn with_open(mut self, open: Vec<f64>) -> Result<Self, EngineError> {
        self.check_len(input::OPEN, open.len())?;
        self.open = Some(open);
        Ok(self)
    }

    pub fn with_high(mut self, high: Vec<f64>) -> Result<Self, EngineError> {
        self.check_len(input::HIGH, high.len())?;
        self.high = Some(high);
        Ok(self)
    }

    pub fn with_low(mut self, low: Vec<f64>) -> Result<Self, EngineError> {
        self.check_len(input::LOW, low.len())?;
        self.low = Some(low);
        Ok(self)
    }

    pub fn with_volume(mut self, volume: Vec<f64>) -> Result<Self, EngineError> {
        self.check_len(input::VOLUME, volume.len())?;
        if let Some(index) = volume.iter().position(|v| *v < 0.0) {
            return Err(EngineError::NegativeVolume {
                index,
                value: volume[index],
            });
        }
        self.volume = Some(volume);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    pub fn closes(&self) -> &[f64] {
        &self.close
    }

    pub fn dates(&self) -> Option<&[NaiveDate]> {
        self.dates.as_deref()
    }

    /// Whether the series carries the named input column.
    pub fn has_column(&self, name: &str) -> bool {
        match name {
            input::CLOSE => true,
            input::DATE => self.dates.is_some(),
            other => self.numeric(other).is_some(),
        }
    }

    /// Borrow a numeric input column, failing fast when it is absent.
    pub fn require(&self, name: &'static str) -> Result<&[f64], EngineError> {
        self.numeric(name).ok_or(EngineError::MissingColumn(name))
    }

    fn numeric(&self, name: &str) -> Option<&[f64]> {
        match name {
            input::OPEN => self.open.as_deref(),
            input::HIGH => self.high.as_deref(),
            input::LOW => self.low.as_deref(),
            input::CLOSE => Some(&self.close),
            input::VOLUME => self.volume.as_deref(),
            _ => None,
        }
    }

    fn check_len(&self, column: &'static str, actual: usize) -> Result<(), EngineError> {
        if actual != self.close.len() {
            return Err(EngineError::LengthMismatch {
                column,
                expected: self.close.len(),
                actual,
            });
        }
        Ok(())
    }
}
