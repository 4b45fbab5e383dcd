use thiserror::Error;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid row count '{input}': {reason}")]
    RowCount { input: String, reason: String },

    #[error("Invalid selectivity '{input}': {reason}")]
    Selectivity { input: String, reason: String },

    #[error("Total requested cardinality {requested} must be below the {rows} rows of table {table}")]
    CardinalityOverflow {
        table: String,
        rows: u64,
        requested: u64,
    },

    #[error("Config document error: {0}")]
    Document(String),
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Document(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Document(e.to_string())
    }
}
