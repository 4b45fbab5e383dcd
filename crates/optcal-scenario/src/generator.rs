//! ScenarioGenerator: one `ExplainOnly` scenario plus `repetitions` copies of
//! the `Index` and `TableScan` scenarios for every (row count, selectivity)
//! pair, shuffled.
//!
//! The shuffle only exists to spread warm-up effects over the run. Reports
//! group on scenario id, so the permutation never shows in the results.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use optcal_core::config::CalibrationConfig;
use optcal_core::error::Result;
use optcal_core::id::{row_count_label, table_name, ScenarioId};
use optcal_core::scenario::{TestScenario, Variant};
use optcal_core::selectivity::{resolve_specs, Selectivity, SelectivitySpec};

use crate::query::predicate_query;

/// A table of the matrix and the cardinalities it must be shaped to.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePlan {
    pub table: String,
    pub rows: u64,
    pub specs: Vec<SelectivitySpec>,
}

/// Resolve every row count's selectivities, failing before any I/O.
pub fn table_plans(row_counts: &[u64], selectivities: &[Selectivity]) -> Result<Vec<TablePlan>> {
    row_counts
        .iter()
        .map(|&rows| {
            Ok(TablePlan {
                table: table_name(rows),
                rows,
                specs: resolve_specs(rows, selectivities)?,
            })
        })
        .collect()
}

pub struct ScenarioGenerator {
    repetitions: usize,
    rng: StdRng,
}

impl ScenarioGenerator {
    /// `seed` fixes the shuffle; `None` seeds from entropy.
    pub fn new(repetitions: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { repetitions, rng }
    }

    pub fn from_config(cfg: &CalibrationConfig) -> Self {
        Self::new(cfg.repetitions, cfg.seed)
    }

    pub fn generate(
        &mut self,
        row_counts: &[u64],
        selectivities: &[Selectivity],
    ) -> Result<Vec<TestScenario>> {
        let plans = table_plans(row_counts, selectivities)?;
        Ok(self.generate_for(&plans))
    }

    pub fn generate_for(&mut self, plans: &[TablePlan]) -> Vec<TestScenario> {
        let mut scenarios = Vec::new();
        for plan in plans {
            for spec in &plan.specs {
                scenarios.push(scenario(plan, spec, Variant::ExplainOnly));
                for _ in 0..self.repetitions {
                    scenarios.push(scenario(plan, spec, Variant::Index));
                    scenarios.push(scenario(plan, spec, Variant::TableScan));
                }
            }
        }
        scenarios.shuffle(&mut self.rng);
        debug!(count = scenarios.len(), "generated scenarios");
        scenarios
    }
}

fn scenario(plan: &TablePlan, spec: &SelectivitySpec, variant: Variant) -> TestScenario {
    let label = row_count_label(plan.rows);
    let name = match variant {
        Variant::ExplainOnly => "Optimizer choice",
        Variant::Index => "Index lookup",
        Variant::TableScan => "Table scan",
    };
    TestScenario {
        id: ScenarioId::new(plan.rows, spec.cardinality),
        variant,
        name: format!("{name} - {label} rows, {} matching", spec.cardinality),
        query: predicate_query(&plan.table, spec.value(), variant),
        table: plan.table.clone(),
        row_count: plan.rows,
        cardinality: spec.cardinality,
        explain_only: variant == Variant::ExplainOnly,
    }
}
