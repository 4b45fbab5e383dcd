//! `calibrate --json` output document.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use uuid::Uuid;

use optcal_core::config::{CalibrationConfig, ConnectionConfig};
use optcal_exec::RunSummary;
use optcal_report::Aggregation;

use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct RunExport<'a> {
    pub id: Uuid,
    pub version: &'static str,

    /// Milliseconds since Unix epoch (UTC).
    pub started_ms: u64,
    pub finished_ms: u64,

    /// Password blanked.
    pub connection: ConnectionConfig,
    pub calibration: &'a CalibrationConfig,
    pub summary: &'a RunSummary,
    pub aggregation: &'a Aggregation,
}

impl<'a> RunExport<'a> {
    pub fn new(
        started_ms: u64,
        connection: &ConnectionConfig,
        calibration: &'a CalibrationConfig,
        summary: &'a RunSummary,
        aggregation: &'a Aggregation,
    ) -> Self {
        let mut connection = connection.clone();
        if !connection.password.is_empty() {
            connection.password = "***".to_string();
        }
        Self {
            id: Uuid::new_v4(),
            version: optcal_core::VERSION,
            started_ms,
            finished_ms: now_millis(),
            connection,
            calibration,
            summary,
            aggregation,
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<(), CliError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|source| CliError::WriteFile {
            path: path.to_path_buf(),
            source,
        })
    }
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_blanked() {
        let connection = ConnectionConfig {
            password: "secret".into(),
            ..Default::default()
        };
        let calibration = CalibrationConfig::default();
        let summary = RunSummary::default();
        let aggregation = Aggregation::default();
        let export = RunExport::new(1, &connection, &calibration, &summary, &aggregation);
        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["connection"]["password"], "***");
        assert_eq!(json["started_ms"], 1);
        assert!(export.finished_ms >= export.started_ms);
    }
}
