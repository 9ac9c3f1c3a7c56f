// =============================================================================
// Annotated Series — the engine's output table
// =============================================================================
//
// The input series plus named indicator columns and the boolean bounce
// signal, all index-aligned. Row count is always the input's row count.
// =============================================================================

use chrono::NaiveDate;

use crate::error::EngineError;
use crate::indicators::{columns, Series};
use crate::types::PriceSeries;

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedSeries {
    series: PriceSeries,
    columns: Vec<(&'static str, Series)>,
    signal: Vec<bool>,
}

impl AnnotatedSeries {
    /// Start from an input series with no indicator columns and an all-false
    /// signal.
    pub fn new(series: PriceSeries) -> Self {
        let signal = vec![false; series.len()];
        Self {
            series,
            columns: Vec::new(),
            signal,
        }
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    /// Append (or replace) a named column.
    pub fn insert(&mut self, name: &'static str, values: Series) -> Result<(), EngineError> {
        if values.len() != self.len() {
            return Err(EngineError::LengthMismatch {
                column: name,
                expected: self.len(),
                actual: values.len(),
            });
        }
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((name, values)),
        }
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Borrow a column that a signal rule depends on.
    pub fn require(&self, name: &'static str) -> Result<&[Option<f64>], EngineError> {
        self.column(name).ok_or(EngineError::MissingColumn(name))
    }

    /// Indicator column names in insertion order, followed by the signal.
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .map(|(n, _)| *n)
            .chain(std::iter::once(columns::BOUNCE_SIGNAL))
            .collect()
    }

    pub fn value(&self, name: &str, index: usize) -> Option<f64> {
        self.column(name)?.get(index).copied().flatten()
    }

    /// Value of `name` on the final row, if defined there.
    pub fn last_value(&self, name: &str) -> Option<f64> {
        self.value(name, self.len().checked_sub(1)?)
    }

    pub fn signal(&self) -> &[bool] {
        &self.signal
    }

    pub(crate) fn set_signal(&mut self, signal: Vec<bool>) -> Result<(), EngineError> {
        if signal.len() != self.len() {
            return Err(EngineError::LengthMismatch {
                column: columns::BOUNCE_SIGNAL,
                expected: self.len(),
                actual: signal.len(),
            });
        }
        self.signal = signal;
        Ok(())
    }

    /// Row indices where the signal fired.
    pub fn fired_indices(&self) -> Vec<usize> {
        self.signal
            .iter()
            .enumerate()
            .filter_map(|(i, fired)| fired.then_some(i))
            .collect()
    }

    pub fn date(&self, index: usize) -> Option<NaiveDate> {
        self.series.dates()?.get(index).copied()
    }

    pub fn close(&self, index: usize) -> Option<f64> {
        self.series.closes().get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AnnotatedSeries {
        AnnotatedSeries::new(PriceSeries::from_closes(vec![1.0, 2.0, 3.0]))
    }

    #[test]
    fn new_table_has_signal_column_and_no_indicators() {
        let t = table();
        assert_eq!(t.signal(), &[false, false, false]);
        assert_eq!(t.column_names(), vec![columns::BOUNCE_SIGNAL]);
    }

    #[test]
    fn empty_table_still_lists_signal_column() {
        let t = AnnotatedSeries::new(PriceSeries::empty());
        assert!(t.signal().is_empty());
        assert_eq!(t.column_names(), vec![columns::BOUNCE_SIGNAL]);
        assert_eq!(t.last_value(columns::RSI), None);
    }

    #[test]
    fn insert_rejects_misaligned_column() {
        let mut t = table();
        let err = t.insert(columns::RSI, vec![Some(1.0)]).unwrap_err();
        assert!(matches!(err, EngineError::LengthMismatch { column: "rsi", .. }));
    }

    #[test]
    fn insert_replaces_existing_column() {
        let mut t = table();
        t.insert(columns::SMA, vec![None, None, Some(2.0)]).unwrap();
        t.insert(columns::SMA, vec![None, Some(1.5), Some(2.5)]).unwrap();
        assert_eq!(t.column_names(), vec![columns::SMA, columns::BOUNCE_SIGNAL]);
        assert_eq!(t.last_value(columns::SMA), Some(2.5));
        assert_eq!(t.value(columns::SMA, 0), None);
    }

    #[test]
    fn require_names_missing_column() {
        assert_eq!(
            table().require(columns::MACD),
            Err(EngineError::MissingColumn("macd"))
        );
    }

    #[test]
    fn fired_indices_follow_signal() {
        let mut t = table();
        t.set_signal(vec![false, true, true]).unwrap();
        assert_eq!(t.fired_indices(), vec![1, 2]);
        assert!(t.set_signal(vec![true]).is_err());
    }
}
