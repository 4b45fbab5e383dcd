use thiserror::Error;

use optcal_core::id::ScenarioId;
use optcal_io::IoError;
use optcal_plan::ParseError;
use optcal_shape::ShapeError;

/// Result type local to optcal-exec.
pub type Result<T> = std::result::Result<T, ExecError>;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("configuration: {0}")]
    Config(#[from] optcal_core::Error),

    #[error("sql: {0}")]
    Io(#[from] IoError),

    #[error("shaping: {0}")]
    Shape(#[from] ShapeError),

    #[error("plan: {0}")]
    Parse(#[from] ParseError),

    #[error("scenario {scenario}: result cache still hit (ratio {ratio:.2}) after invalidation")]
    CacheContaminated { scenario: ScenarioId, ratio: f64 },

    #[error("no shaping plan for table {table}")]
    UnknownTable { table: String },
}

impl ExecError {
    /// Fatal errors abort the run; anything else only skips the scenario.
    ///
    /// Shaping failures are fatal because every later scenario on the table
    /// depends on its distribution.
    pub fn is_fatal(&self) -> bool {
        match self {
            ExecError::Config(_) | ExecError::Shape(_) => true,
            ExecError::Io(e) => e.is_connectivity(),
            ExecError::Parse(_)
            | ExecError::CacheContaminated { .. }
            | ExecError::UnknownTable { .. } => false,
        }
    }
}
