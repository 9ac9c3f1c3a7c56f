// =============================================================================
// Engine Errors
// =============================================================================
//
// Only caller contract violations surface here. Degenerate data (empty series,
// short series, flat prices) is handled by undefined-value propagation and
// never produces an error.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A requested indicator or condition needs an input column the series
    /// does not carry (e.g. `Low` for the support-bounce rule).
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("column `{column}` has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("dates must be strictly increasing (violated at row {index})")]
    UnorderedDates { index: usize },

    #[error("negative volume {value} at row {index}")]
    NegativeVolume { index: usize, value: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
