use thiserror::Error;

/// Result type local to optcal-shape.
pub type Result<T> = std::result::Result<T, ShapeError>;

#[derive(Debug, Error)]
pub enum ShapeError {
    #[error(transparent)]
    Config(#[from] optcal_core::Error),

    #[error("table {table}: expected {expected} rows, found {actual}")]
    RowCountMismatch {
        table: String,
        expected: u64,
        actual: u64,
    },

    #[error("table {table}: no rows changed while moving rows to value {value}")]
    NoProgress { table: String, value: i64 },

    #[error("table {table}: value {value} did not converge within {iterations} iterations")]
    ConvergenceFailed {
        table: String,
        value: i64,
        iterations: usize,
    },

    #[error("table {table}: value {value} matches {actual} rows, expected {expected}")]
    VerificationFailed {
        table: String,
        value: i64,
        expected: u64,
        actual: u64,
    },

    #[error("table backend error: {0}")]
    Backend(String),
}
