//! Harness configuration that downstream crates can serialize/deserialize.
//!
//! Precedence, lowest first: `Default`, YAML document, `OPTCAL_*`
//! environment variables, command-line flags (applied by the binary).

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::selectivity::{resolve_specs, Selectivity, SelectivitySpec};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Applied once at connect time, to every statement of the run.
    pub timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 4000,
            user: "root".to_string(),
            password: String::new(),
            database: "test".to_string(),
            timeout_secs: 10,
        }
    }
}

impl ConnectionConfig {
    /// Overlay environment variables onto the current values.
    ///
    /// - `OPTCAL_HOST`, `OPTCAL_PORT`
    /// - `OPTCAL_USER`, `OPTCAL_PASSWORD`
    /// - `OPTCAL_DATABASE`
    /// - `OPTCAL_TIMEOUT_SECS`
    pub fn apply_env(&mut self) {
        if let Ok(s) = std::env::var("OPTCAL_HOST") {
            self.host = s;
        }
        if let Ok(s) = std::env::var("OPTCAL_PORT") {
            if let Ok(v) = s.parse::<u16>() {
                self.port = v;
            }
        }
        if let Ok(s) = std::env::var("OPTCAL_USER") {
            self.user = s;
        }
        if let Ok(s) = std::env::var("OPTCAL_PASSWORD") {
            self.password = s;
        }
        if let Ok(s) = std::env::var("OPTCAL_DATABASE") {
            self.database = s;
        }
        if let Ok(s) = std::env::var("OPTCAL_TIMEOUT_SECS") {
            if let Ok(v) = s.parse::<u64>() {
                self.timeout_secs = v;
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(Error::Config("port must be positive".into()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("connect timeout must be positive".into()));
        }
        Ok(())
    }
}

/// Plan representation requested from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanFormat {
    /// Tabular rows (5 columns static, 9 columns executed).
    #[default]
    Brief,
    /// One JSON document per plan.
    Json,
}

impl FromStr for PlanFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brief" | "row" | "tabular" => Ok(PlanFormat::Brief),
            "json" | "tidb_json" => Ok(PlanFormat::Json),
            other => Err(Error::Config(format!("unknown plan format '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub row_counts: Vec<u64>,
    pub selectivities: Vec<Selectivity>,
    /// Copies of each hinted scenario.
    pub repetitions: usize,

    /// Seed for the scenario shuffle and for shaping filler values.
    /// `None` draws from OS entropy.
    pub seed: Option<u64>,

    pub plan_format: PlanFormat,

    /// Rows inserted per bulk-populate statement.
    pub populate_batch_rows: u64,

    /// Rows reassigned per shaping/invalidation update.
    pub shape_batch_rows: u64,

    /// Cap on iterations of any batch loop. `None` loops until converged.
    pub max_iterations: Option<usize>,

    /// Shape every table before the first measurement.
    pub prepare_tables_upfront: bool,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            row_counts: vec![1_000, 10_000, 100_000],
            selectivities: vec![
                Selectivity::Ratio(0.02),
                Selectivity::Ratio(0.05),
                Selectivity::Ratio(0.075),
                Selectivity::Ratio(0.1),
                Selectivity::Ratio(0.15),
                Selectivity::Ratio(0.2),
            ],
            repetitions: 3,
            seed: None,
            plan_format: PlanFormat::Brief,
            populate_batch_rows: 100_000,
            shape_batch_rows: 50_000,
            max_iterations: Some(100_000),
            prepare_tables_upfront: true,
        }
    }
}

impl CalibrationConfig {
    /// Environment variables:
    /// - `OPTCAL_REPETITIONS`
    /// - `OPTCAL_SEED`
    /// - `OPTCAL_PLAN_FORMAT` (`brief` or `json`)
    /// - `OPTCAL_POPULATE_BATCH_ROWS`, `OPTCAL_SHAPE_BATCH_ROWS`
    /// - `OPTCAL_MAX_ITERATIONS` (`0` disables the cap)
    pub fn apply_env(&mut self) {
        if let Ok(s) = std::env::var("OPTCAL_REPETITIONS") {
            if let Ok(v) = s.parse::<usize>() {
                self.repetitions = v;
            }
        }
        if let Ok(s) = std::env::var("OPTCAL_SEED") {
            if let Ok(v) = s.parse::<u64>() {
                self.seed = Some(v);
            }
        }
        if let Ok(s) = std::env::var("OPTCAL_PLAN_FORMAT") {
            if let Ok(v) = s.parse::<PlanFormat>() {
                self.plan_format = v;
            }
        }
        if let Ok(s) = std::env::var("OPTCAL_POPULATE_BATCH_ROWS") {
            if let Ok(v) = s.parse::<u64>() {
                self.populate_batch_rows = v;
            }
        }
        if let Ok(s) = std::env::var("OPTCAL_SHAPE_BATCH_ROWS") {
            if let Ok(v) = s.parse::<u64>() {
                self.shape_batch_rows = v;
            }
        }
        if let Ok(s) = std::env::var("OPTCAL_MAX_ITERATIONS") {
            if let Ok(v) = s.parse::<usize>() {
                self.max_iterations = (v > 0).then_some(v);
            }
        }
    }

    /// Shaping targets for one table of the matrix.
    pub fn specs_for(&self, rows: u64) -> Result<Vec<SelectivitySpec>> {
        resolve_specs(rows, &self.selectivities)
    }

    /// Every configuration check, run before any I/O.
    pub fn validate(&self) -> Result<()> {
        if self.row_counts.is_empty() {
            return Err(Error::Config("no row counts given".into()));
        }
        if self.repetitions == 0 {
            return Err(Error::Config("repetitions must be at least 1".into()));
        }
        if self.populate_batch_rows == 0 || self.shape_batch_rows == 0 {
            return Err(Error::Config("batch sizes must be positive".into()));
        }
        if self.max_iterations == Some(0) {
            return Err(Error::Config("max_iterations must be positive when set".into()));
        }
        for (i, rows) in self.row_counts.iter().enumerate() {
            if self.row_counts[..i].contains(rows) {
                return Err(Error::Config(format!("row count {rows} listed twice")));
            }
            self.specs_for(*rows)?;
        }
        Ok(())
    }
}

/// On-disk configuration document (`--config file.yaml`).
///
/// ```yaml
/// connection:
///   host: 127.0.0.1
///   port: 4000
/// calibration:
///   row_counts: [1000, 100000]
///   selectivities: [0.01, 0.1, 500]
///   repetitions: 5
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigDocument {
    pub connection: ConnectionConfig,
    pub calibration: CalibrationConfig,
}

impl ConfigDocument {
    pub fn from_yaml(src: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(src)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        CalibrationConfig::default().validate().expect("defaults validate");
        ConnectionConfig::default().validate().expect("defaults validate");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let doc = ConfigDocument::from_yaml(
            "connection:\n  host: db.internal\ncalibration:\n  selectivities: [0.01, 500]\n  repetitions: 5\n",
        )
        .expect("yaml parses");
        assert_eq!(doc.connection.host, "db.internal");
        assert_eq!(doc.connection.port, 4000);
        assert_eq!(doc.calibration.repetitions, 5);
        assert_eq!(
            doc.calibration.selectivities,
            vec![Selectivity::Ratio(0.01), Selectivity::Absolute(500)]
        );
        assert_eq!(doc.calibration.row_counts, vec![1_000, 10_000, 100_000]);
    }

    #[test]
    fn test_yaml_rejects_invalid_selectivity() {
        assert!(ConfigDocument::from_yaml("calibration:\n  selectivities: [-1]\n").is_err());
    }

    #[test]
    fn test_validate_catches_overflowing_selectivities() {
        let cfg = CalibrationConfig {
            row_counts: vec![100],
            selectivities: vec![Selectivity::Ratio(0.6), Selectivity::Ratio(0.5)],
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(Error::CardinalityOverflow { rows: 100, .. })
        ));
    }

    #[test]
    fn test_validate_catches_zero_repetitions_and_duplicates() {
        let cfg = CalibrationConfig {
            repetitions: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = CalibrationConfig {
            row_counts: vec![1000, 1000],
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_values_the_int_column_cannot_hold() {
        let cfg = CalibrationConfig {
            row_counts: vec![5_000_000_000],
            selectivities: vec![Selectivity::Ratio(0.5)],
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::Selectivity { .. })));
    }

    #[test]
    fn test_validate_counts_equal_cardinalities_twice() {
        let cfg = CalibrationConfig {
            row_counts: vec![100],
            selectivities: vec![Selectivity::Ratio(0.5), Selectivity::Absolute(50)],
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(Error::CardinalityOverflow {
                rows: 100,
                requested: 100,
                ..
            })
        ));
    }

    #[test]
    fn test_plan_format_from_str() {
        assert_eq!("brief".parse::<PlanFormat>().unwrap(), PlanFormat::Brief);
        assert_eq!("JSON".parse::<PlanFormat>().unwrap(), PlanFormat::Json);
        assert!("dot".parse::<PlanFormat>().is_err());
    }
}
