// =============================================================================
// Bar CSV Loader
// =============================================================================
//
// Reads daily bars from a `Date,Open,High,Low,Close,Volume` CSV (the layout
// written by most market-data downloaders) into a `PriceSeries`.
//
// Only `Close` is mandatory. Every other column is picked up when its header
// is present (case-insensitive) and skipped otherwise. Dates are `%Y-%m-%d`;
// longer timestamps such as `2024-01-02 00:00:00-05:00` are cut to their date
// part.
//
// Loader failures are `anyhow` errors and stay here: the engine only ever
// sees a validated series.
// =============================================================================

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;

use crate::types::{input, PriceSeries};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Optional numeric columns, in the order they are attached to the series.
const OPTIONAL_COLUMNS: [&str; 4] = [input::OPEN, input::HIGH, input::LOW, input::VOLUME];

/// Load a bar CSV from disk.
pub fn load_csv(path: impl AsRef<Path>) -> Result<PriceSeries> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open bar file {}", path.display()))?;

    let series = read_csv(std::io::BufReader::new(file))
        .with_context(|| format!("failed to load bars from {}", path.display()))?;

    info!(
        path = %path.display(),
        rows = series.len(),
        has_dates = series.dates().is_some(),
        has_low = series.has_column(input::LOW),
        has_volume = series.has_column(input::VOLUME),
        "bar file loaded"
    );
    Ok(series)
}

/// Parse bars from any CSV source with a header row.
pub fn read_csv<R: Read>(source: R) -> Result<PriceSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers().context("failed to read CSV header")?.clone();
    let position = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let close_idx = position(input::CLOSE)
        .with_context(|| format!("CSV has no `{}` column", input::CLOSE))?;
    let date_idx = position(input::DATE);
    let optional: Vec<(&'static str, usize)> = OPTIONAL_COLUMNS
        .iter()
        .filter_map(|&name| position(name).map(|idx| (name, idx)))
        .collect();

    let mut closes = Vec::new();
    let mut dates = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); optional.len()];

    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("malformed CSV record at row {row}"))?;

        closes.push(parse_number(&record, close_idx, input::CLOSE, row)?);
        if let Some(idx) = date_idx {
            dates.push(parse_date(field(&record, idx, input::DATE, row)?, row)?);
        }
        for (&(name, idx), values) in optional.iter().zip(columns.iter_mut()) {
            values.push(parse_number(&record, idx, name, row)?);
        }
    }

    let mut series = PriceSeries::from_closes(closes);
    if date_idx.is_some() {
        series = series.with_dates(dates).context("invalid Date column")?;
    }
    for ((name, _), values) in optional.into_iter().zip(columns) {
        series = match name {
            input::OPEN => series.with_open(values),
            input::HIGH => series.with_high(values),
            input::LOW => series.with_low(values),
            _ => series.with_volume(values),
        }
        .with_context(|| format!("invalid {name} column"))?;
    }
    Ok(series)
}

fn field<'r>(record: &'r csv::StringRecord, idx: usize, name: &str, row: usize) -> Result<&'r str> {
    record
        .get(idx)
        .with_context(|| format!("row {row} has no `{name}` field"))
}

fn parse_number(record: &csv::StringRecord, idx: usize, name: &str, row: usize) -> Result<f64> {
    let raw = field(record, idx, name, row)?;
    raw.parse::<f64>()
        .with_context(|| format!("row {row}: `{name}` value '{raw}' is not a number"))
}

fn parse_date(raw: &str, row: usize) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .or_else(|err| match raw.get(..10) {
            Some(prefix) if raw.len() > 10 => NaiveDate::parse_from_str(prefix, DATE_FORMAT),
            _ => Err(err),
        })
        .with_context(|| format!("row {row}: unrecognised date '{raw}'"))
}
