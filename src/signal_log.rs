// =============================================================================
// Signal Log — append-only record of bars where the bounce signal fired
// =============================================================================
//
// One CSV row per fired bar: id, timestamp, ticker, row index, date, close,
// the RSI at that bar (when the policy computed it) and the fixed label
// `Bounce`. The header is written only when the file is new or empty, so
// repeated runs keep appending to the same table.
// =============================================================================

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::annotated::AnnotatedSeries;
use crate::indicators::columns;

pub const SIGNAL_LABEL: &str = "Bounce";

/// One fired bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// ISO 8601 time the record was created.
    pub timestamp: String,

    pub ticker: String,

    /// Row index in the annotated series.
    pub row: usize,

    pub date: Option<NaiveDate>,

    pub close: f64,

    /// RSI at the fired bar, if the series carries an RSI column.
    pub indicator: Option<f64>,

    pub signal: String,
}

impl SignalRecord {
    /// Build one record per fired row of `table`, in row order.
    pub fn from_annotated(table: &AnnotatedSeries, ticker: &str) -> Vec<Self> {
        let timestamp = chrono::Utc::now().to_rfc3339();
        table
            .fired_indices()
            .into_iter()
            .filter_map(|row| {
                Some(Self {
                    id: uuid::Uuid::new_v4().to_string(),
                    timestamp: timestamp.clone(),
                    ticker: ticker.to_string(),
                    row,
                    date: table.date(row),
                    close: table.close(row)?,
                    indicator: table.value(columns::RSI, row),
                    signal: SIGNAL_LABEL.to_string(),
                })
            })
            .collect()
    }
}

/// CSV-backed signal log.
#[derive(Debug, Clone)]
pub struct SignalLog {
    path: PathBuf,
}

impl SignalLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `records`, creating the file (with a header) if needed.
    ///
    /// An empty slice leaves the file untouched.
    pub fn append(&self, records: &[SignalRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let needs_header = std::fs::metadata(&self.path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open signal log {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        for record in records {
            writer
                .serialize(record)
                .with_context(|| format!("failed to write signal row {}", record.row))?;
        }
        writer
            .flush()
            .with_context(|| format!("failed to flush signal log {}", self.path.display()))?;

        info!(
            path = %self.path.display(),
            appended = records.len(),
            header = needs_header,
            "signal log updated"
        );
        Ok(records.len())
    }

    /// Every record in the log, oldest first. A missing file reads as empty.
    pub fn read_all(&self) -> Result<Vec<SignalRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("failed to open signal log {}", self.path.display()))?;
        reader
            .deserialize::<SignalRecord>()
            .enumerate()
            .map(|(row, record)| {
                record.with_context(|| format!("malformed signal log record at row {row}"))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PriceSeries;

    fn fired_table() -> AnnotatedSeries {
        let dates = (1..=3)
            .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
            .collect();
        let series = PriceSeries::from_closes(vec![10.0, 11.0, 12.0])
            .with_dates(dates)
            .unwrap();
        let mut table = AnnotatedSeries::new(series);
        table
            .insert(columns::RSI, vec![None, Some(25.0), None])
            .unwrap();
        table.set_signal(vec![false, true, true]).unwrap();
        table
    }

    #[test]
    fn records_follow_fired_rows() {
        let records = SignalRecord::from_annotated(&fired_table(), "AAPL");
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].row, 1);
        assert_eq!(records[0].ticker, "AAPL");
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(records[0].close, 11.0);
        assert_eq!(records[0].indicator, Some(25.0));
        assert_eq!(records[0].signal, "Bounce");

        assert_eq!(records[1].indicator, None);
        assert_ne!(records[0].id, records[1].id);
    }

    #[test]
    fn no_fired_rows_no_records() {
        let table = AnnotatedSeries::new(PriceSeries::from_closes(vec![1.0, 2.0]));
        assert!(SignalRecord::from_annotated(&table, "X").is_empty());
    }

    #[test]
    fn append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = SignalLog::new(dir.path().join("signals.csv"));
        let records = SignalRecord::from_annotated(&fired_table(), "AAPL");

        assert_eq!(log.append(&records).unwrap(), 2);
        assert_eq!(log.append(&records[..1]).unwrap(), 1);

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.matches("ticker").count(), 1);
        assert_eq!(content.lines().count(), 4);

        let back = log.read_all().unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back[0], records[0]);
        assert_eq!(back[2].row, 1);
    }

    #[test]
    fn append_nothing_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let log = SignalLog::new(dir.path().join("signals.csv"));
        assert_eq!(log.append(&[]).unwrap(), 0);
        assert!(!log.path().exists());
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn empty_existing_file_gets_header() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let log = SignalLog::new(file.path());
        let records = SignalRecord::from_annotated(&fired_table(), "MSFT");
        log.append(&records).unwrap();
        assert_eq!(log.read_all().unwrap().len(), 2);
    }
}
