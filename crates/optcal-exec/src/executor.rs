//! Executor: shape the target table once, then run one scenario.
//!
//! `ExplainOnly` scenarios only fetch and classify the static plan. Executed
//! scenarios run the query counting rows, then fetch the executed plan of
//! the same session. When that plan shows result-cache hits the predicate
//! value is bounced to invalidate the cache and the query runs exactly once
//! more.

use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use optcal_core::config::CalibrationConfig;
use optcal_core::plan::PlanNode;
use optcal_core::result::TestExecutionResult;
use optcal_core::scenario::TestScenario;
use optcal_io::Session;
use optcal_plan::{cache_hit_ratio, classify, is_contaminated, parse_plan, resource_cost};
use optcal_scenario::TablePlan;
use optcal_shape::{bounce_value, SelectivityShaper, ShapeOptions, ShapeReport};

use crate::error::{ExecError, Result};

/// Tables shaped during this run. Entries are only ever added.
#[derive(Debug, Default, Clone)]
pub struct TableCache {
    ready: BTreeSet<String>,
}

impl TableCache {
    pub fn is_ready(&self, table: &str) -> bool {
        self.ready.contains(table)
    }

    pub fn mark_ready(&mut self, table: &str) {
        self.ready.insert(table.to_string());
    }

    pub fn len(&self) -> usize {
        self.ready.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready.is_empty()
    }
}

/// One timed run of a query and the plan it executed with.
struct Attempt {
    duration: Duration,
    rows: u64,
    plan: PlanNode,
}

pub struct Executor {
    shaper: SelectivityShaper,
    tables: BTreeMap<String, TablePlan>,
    cache: TableCache,
}

impl Executor {
    pub fn new(cfg: &CalibrationConfig, plans: Vec<TablePlan>) -> Self {
        Self {
            shaper: SelectivityShaper::new(ShapeOptions::from(cfg), cfg.seed),
            tables: plans.into_iter().map(|p| (p.table.clone(), p)).collect(),
            cache: TableCache::default(),
        }
    }

    pub fn with_shaper(shaper: SelectivityShaper, plans: Vec<TablePlan>) -> Self {
        Self {
            shaper,
            tables: plans.into_iter().map(|p| (p.table.clone(), p)).collect(),
            cache: TableCache::default(),
        }
    }

    pub fn cache(&self) -> &TableCache {
        &self.cache
    }

    /// Shape `table` unless it already was this run. `None` when cached.
    pub fn prepare_table(
        &mut self,
        session: &mut dyn Session,
        table: &str,
    ) -> Result<Option<ShapeReport>> {
        if self.cache.is_ready(table) {
            return Ok(None);
        }
        let plan = self
            .tables
            .get(table)
            .ok_or_else(|| ExecError::UnknownTable {
                table: table.to_string(),
            })?;
        info!(table, rows = plan.rows, "preparing table");
        let mut handle = session.table(table);
        let report = self.shaper.shape(handle.as_mut(), plan.rows, &plan.specs)?;
        self.cache.mark_ready(table);
        Ok(Some(report))
    }

    /// Shape every table of the matrix, in row-count order.
    pub fn prepare_all(&mut self, session: &mut dyn Session) -> Result<Vec<ShapeReport>> {
        let mut order: Vec<(u64, String)> = self
            .tables
            .values()
            .map(|p| (p.rows, p.table.clone()))
            .collect();
        order.sort();
        let mut reports = Vec::new();
        for (_, table) in order {
            if let Some(report) = self.prepare_table(session, &table)? {
                reports.push(report);
            }
        }
        Ok(reports)
    }

    pub fn execute(
        &mut self,
        session: &mut dyn Session,
        scenario: &TestScenario,
    ) -> Result<TestExecutionResult> {
        self.prepare_table(session, &scenario.table)?;

        if scenario.explain_only {
            let raw = session.static_plan(&scenario.query)?;
            let plan = parse_plan(&raw)?;
            let plan_type = classify(&plan);
            debug!(scenario = %scenario.id, %plan_type, "static plan");
            return Ok(TestExecutionResult {
                scenario_id: scenario.id.clone(),
                variant: scenario.variant,
                query: scenario.query.clone(),
                plan_type,
                duration: Duration::ZERO,
                rows_returned: 0,
                resource_cost: 0.0,
                retried: false,
                plan: Some(plan),
            });
        }

        let mut attempt = run_once(session, &scenario.query)?;
        let mut retried = false;
        if is_contaminated(&attempt.plan) {
            warn!(
                scenario = %scenario.id,
                ratio = cache_hit_ratio(&attempt.plan).unwrap_or(0.0),
                "result cache hit, invalidating and retrying"
            );
            self.invalidate(session, scenario)?;
            attempt = run_once(session, &scenario.query)?;
            retried = true;
            if is_contaminated(&attempt.plan) {
                return Err(ExecError::CacheContaminated {
                    scenario: scenario.id.clone(),
                    ratio: cache_hit_ratio(&attempt.plan).unwrap_or(0.0),
                });
            }
        }

        let plan_type = classify(&attempt.plan);
        debug!(
            scenario = %scenario.id,
            variant = %scenario.variant,
            %plan_type,
            elapsed_ms = attempt.duration.as_secs_f64() * 1000.0,
            rows = attempt.rows,
            "executed"
        );
        Ok(TestExecutionResult {
            scenario_id: scenario.id.clone(),
            variant: scenario.variant,
            query: scenario.query.clone(),
            plan_type,
            duration: attempt.duration,
            rows_returned: attempt.rows,
            resource_cost: resource_cost(&attempt.plan),
            retried,
            plan: Some(attempt.plan),
        })
    }

    fn invalidate(&mut self, session: &mut dyn Session, scenario: &TestScenario) -> Result<()> {
        let options = *self.shaper.options();
        let mut table = session.table(&scenario.table);
        let value = scenario.cardinality as i64;
        let report = bounce_value(table.as_mut(), value, &options)?;
        debug!(table = %scenario.table, value, rows = report.rows, "cache invalidated");
        Ok(())
    }
}

fn run_once(session: &mut dyn Session, sql: &str) -> Result<Attempt> {
    let start = Instant::now();
    let rows = session.run_counting(sql)?;
    let duration = start.elapsed();
    let raw = session.last_plan()?;
    let plan = parse_plan(&raw)?;
    Ok(Attempt {
        duration,
        rows,
        plan,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_cache_is_append_only() {
        let mut cache = TableCache::default();
        assert!(cache.is_empty());
        cache.mark_ready("t1K");
        cache.mark_ready("t1K");
        assert!(cache.is_ready("t1K"));
        assert!(!cache.is_ready("t10K"));
        assert_eq!(cache.len(), 1);
    }
}
