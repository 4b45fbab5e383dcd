use thiserror::Error;

/// Result type local to optcal-io.
pub type Result<T> = std::result::Result<T, IoError>;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: mysql_async::Error,
    },

    #[error("timed out connecting to {addr} after {secs}s")]
    ConnectTimeout { addr: String, secs: u64 },

    #[error("failed to initialize async runtime: {0}")]
    Runtime(String),

    #[error("query failed: {sql}: {source}")]
    Query {
        sql: String,
        #[source]
        source: mysql_async::Error,
    },

    #[error("query returned no rows: {0}")]
    NoRows(String),

    #[error("connection is closed")]
    Closed,
}

impl IoError {
    /// True for failures that leave no usable connection.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            IoError::Connect { .. }
                | IoError::ConnectTimeout { .. }
                | IoError::Runtime(_)
                | IoError::Closed
        )
    }
}
