//! The sequential calibration loop.
//!
//! Configuration is validated and the whole matrix generated before the
//! first statement is sent. Scenario failures are logged and skipped;
//! fatal errors (shaping, lost connection) end the run.

use serde::Serialize;
use tracing::{error, info};

use optcal_core::config::CalibrationConfig;
use optcal_core::id::ScenarioId;
use optcal_core::result::TestExecutionResult;
use optcal_core::scenario::{TestScenario, Variant};
use optcal_io::Session;
use optcal_scenario::{table_plans, ScenarioGenerator};
use optcal_shape::ShapeReport;

use crate::error::Result;
use crate::executor::Executor;
use crate::metrics::RunMetrics;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioFailure {
    pub scenario_id: ScenarioId,
    pub variant: Variant,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub results: Vec<TestExecutionResult>,
    pub failures: Vec<ScenarioFailure>,
    pub shaping: Vec<ShapeReport>,
    pub metrics: RunMetrics,
}

pub fn run_calibration(
    session: &mut dyn Session,
    cfg: &CalibrationConfig,
) -> Result<RunSummary> {
    cfg.validate()?;
    let plans = table_plans(&cfg.row_counts, &cfg.selectivities)?;
    let scenarios = ScenarioGenerator::from_config(cfg).generate_for(&plans);
    let mut executor = Executor::new(cfg, plans);
    run_scenarios(session, &mut executor, &scenarios, cfg.prepare_tables_upfront)
}

/// Run already-generated scenarios in order.
pub fn run_scenarios(
    session: &mut dyn Session,
    executor: &mut Executor,
    scenarios: &[TestScenario],
    prepare_upfront: bool,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();
    summary.metrics.scenarios = scenarios.len();

    if prepare_upfront {
        for report in executor.prepare_all(session)? {
            summary.metrics.record_shaping(report.updates);
            summary.shaping.push(report);
        }
    }

    let total = scenarios.len();
    for (i, scenario) in scenarios.iter().enumerate() {
        let outcome = executor
            .prepare_table(session, &scenario.table)
            .and_then(|report| {
                if let Some(report) = report {
                    summary.metrics.record_shaping(report.updates);
                    summary.shaping.push(report);
                }
                executor.execute(session, scenario)
            });
        match outcome {
            Ok(result) => {
                summary.metrics.record(&result);
                summary.results.push(result);
            }
            Err(e) if e.is_fatal() => {
                error!(scenario = %scenario.id, error = %e, "aborting run");
                return Err(e);
            }
            Err(e) => {
                error!(
                    scenario = %scenario.id,
                    variant = %scenario.variant,
                    error = %e,
                    "scenario skipped"
                );
                summary.metrics.record_skip();
                summary.failures.push(ScenarioFailure {
                    scenario_id: scenario.id.clone(),
                    variant: scenario.variant,
                    error: e.to_string(),
                });
            }
        }
        if (i + 1) % 10 == 0 || i + 1 == total {
            info!(done = i + 1, total, "progress");
        }
    }

    summary.metrics.emit();
    Ok(summary)
}
