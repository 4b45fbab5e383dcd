use std::path::PathBuf;

use thiserror::Error;

use optcal_exec::ExecError;
use optcal_io::IoError;

use crate::exit_codes;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] optcal_core::Error),

    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("cannot read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode results: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::ReadFile { .. } => exit_codes::CONFIG_ERROR,
            CliError::Io(e) if e.is_connectivity() => exit_codes::CONNECTION_ERROR,
            CliError::Exec(ExecError::Config(_)) => exit_codes::CONFIG_ERROR,
            CliError::Exec(ExecError::Io(e)) if e.is_connectivity() => {
                exit_codes::CONNECTION_ERROR
            }
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}
