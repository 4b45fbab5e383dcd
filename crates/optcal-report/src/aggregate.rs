//! Per-scenario and overall statistics.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use optcal_core::prelude::{PlanType, ScenarioId, TestExecutionResult};

/// Timing and cost of the executed runs that ended up with one plan type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeStats {
    pub plan_type: PlanType,
    pub runs: usize,
    pub min: Duration,
    pub avg: Duration,
    pub max: Duration,
    pub avg_resource_cost: f64,
}

impl TypeStats {
    fn from_runs(plan_type: PlanType, runs: &[&TestExecutionResult]) -> Option<Self> {
        let min = runs.iter().map(|r| r.duration).min()?;
        let max = runs.iter().map(|r| r.duration).max()?;
        let total: Duration = runs.iter().map(|r| r.duration).sum();
        let cost: f64 = runs.iter().map(|r| r.resource_cost).sum();
        let n = runs.len();
        Some(Self {
            plan_type,
            runs: n,
            min,
            avg: total / n as u32,
            max,
            avg_resource_cost: cost / n as f64,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub id: ScenarioId,
    /// Plan type of the unhinted static plan, if it was inspected.
    pub optimizer_choice: Option<PlanType>,
    pub by_type: BTreeMap<PlanType, TypeStats>,
    /// Executed runs that needed a cache-invalidation retry.
    pub retried: usize,
}

impl ScenarioSummary {
    /// The optimizer picked a plan type that no executed run exercised.
    pub fn coverage_gap(&self) -> bool {
        self.optimizer_choice
            .is_some_and(|choice| !self.by_type.contains_key(&choice))
    }

    /// Whether the optimizer's choice was the faster of the two access paths
    /// on average. `None` unless both were measured and the choice is one of
    /// them.
    pub fn chose_fastest(&self) -> Option<bool> {
        let index = self.by_type.get(&PlanType::IndexAccess)?;
        let scan = self.by_type.get(&PlanType::FullScan)?;
        match self.optimizer_choice? {
            PlanType::IndexAccess => Some(index.avg <= scan.avg),
            PlanType::FullScan => Some(scan.avg <= index.avg),
            PlanType::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverallSummary {
    pub scenarios: usize,
    pub executed_runs: usize,
    pub by_type: BTreeMap<PlanType, TypeStats>,
    pub choices: BTreeMap<PlanType, usize>,
    pub index_choice_pct: f64,
    pub full_scan_choice_pct: f64,
    /// Scenarios where both access paths were measured and the choice is one
    /// of them.
    pub comparable: usize,
    pub chose_fastest: usize,
    pub coverage_gaps: Vec<ScenarioId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregation {
    /// Executed results, sorted by scenario id then variant.
    pub details: Vec<TestExecutionResult>,
    /// One entry per scenario id, sorted.
    pub scenarios: Vec<ScenarioSummary>,
    pub overall: OverallSummary,
}

fn stats_by_type(runs: &[&TestExecutionResult]) -> BTreeMap<PlanType, TypeStats> {
    let mut groups: BTreeMap<PlanType, Vec<&TestExecutionResult>> = BTreeMap::new();
    for r in runs {
        groups.entry(r.plan_type).or_default().push(r);
    }
    groups
        .into_iter()
        .filter_map(|(t, runs)| TypeStats::from_runs(t, &runs).map(|s| (t, s)))
        .collect()
}

pub fn aggregate(results: &[TestExecutionResult]) -> Aggregation {
    let mut grouped: BTreeMap<&ScenarioId, Vec<&TestExecutionResult>> = BTreeMap::new();
    for r in results {
        grouped.entry(&r.scenario_id).or_default().push(r);
    }

    let scenarios: Vec<ScenarioSummary> = grouped
        .into_iter()
        .map(|(id, group)| {
            let optimizer_choice = group
                .iter()
                .find(|r| r.is_explain_only())
                .map(|r| r.plan_type);
            let executed: Vec<&TestExecutionResult> = group
                .iter()
                .copied()
                .filter(|r| !r.is_explain_only())
                .collect();
            ScenarioSummary {
                id: id.clone(),
                optimizer_choice,
                by_type: stats_by_type(&executed),
                retried: executed.iter().filter(|r| r.retried).count(),
            }
        })
        .collect();

    let mut details: Vec<TestExecutionResult> = results
        .iter()
        .filter(|r| !r.is_explain_only())
        .cloned()
        .collect();
    details.sort_by(|a, b| {
        a.scenario_id
            .cmp(&b.scenario_id)
            .then(a.variant.cmp(&b.variant))
    });

    let all_executed: Vec<&TestExecutionResult> = details.iter().collect();
    let mut overall = OverallSummary {
        scenarios: scenarios.len(),
        executed_runs: details.len(),
        by_type: stats_by_type(&all_executed),
        ..Default::default()
    };
    for s in &scenarios {
        if let Some(choice) = s.optimizer_choice {
            *overall.choices.entry(choice).or_default() += 1;
        }
        if let Some(fastest) = s.chose_fastest() {
            overall.comparable += 1;
            if fastest {
                overall.chose_fastest += 1;
            }
        }
        if s.coverage_gap() {
            overall.coverage_gaps.push(s.id.clone());
        }
    }
    let decided: usize = overall.choices.values().sum();
    if decided > 0 {
        let pct = |t: PlanType| {
            overall.choices.get(&t).copied().unwrap_or(0) as f64 * 100.0 / decided as f64
        };
        overall.index_choice_pct = pct(PlanType::IndexAccess);
        overall.full_scan_choice_pct = pct(PlanType::FullScan);
    }

    Aggregation {
        details,
        scenarios,
        overall,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optcal_core::prelude::Variant;

    fn result(id: &str, variant: Variant, plan_type: PlanType, ms: u64) -> TestExecutionResult {
        let (rows, card) = id.split_once('/').unwrap();
        TestExecutionResult {
            scenario_id: ScenarioId::new(rows.parse().unwrap(), card.parse().unwrap()),
            variant,
            query: String::new(),
            plan_type,
            duration: Duration::from_millis(ms),
            rows_returned: 0,
            resource_cost: ms as f64 / 10.0,
            retried: false,
            plan: None,
        }
    }

    #[test]
    fn test_type_stats() {
        let results = vec![
            result("1000/100", Variant::ExplainOnly, PlanType::IndexAccess, 0),
            result("1000/100", Variant::Index, PlanType::IndexAccess, 2),
            result("1000/100", Variant::Index, PlanType::IndexAccess, 4),
            result("1000/100", Variant::TableScan, PlanType::FullScan, 9),
        ];
        let agg = aggregate(&results);
        assert_eq!(agg.scenarios.len(), 1);
        let s = &agg.scenarios[0];
        assert_eq!(s.optimizer_choice, Some(PlanType::IndexAccess));
        let index = &s.by_type[&PlanType::IndexAccess];
        assert_eq!(index.runs, 2);
        assert_eq!(index.min, Duration::from_millis(2));
        assert_eq!(index.avg, Duration::from_millis(3));
        assert_eq!(index.max, Duration::from_millis(4));
        assert!((index.avg_resource_cost - 0.3).abs() < 1e-9);
        assert_eq!(s.chose_fastest(), Some(true));
        assert!(!s.coverage_gap());
        assert_eq!(agg.details.len(), 3);
    }

    #[test]
    fn test_details_sorted_regardless_of_arrival() {
        let results = vec![
            result("10000/1000", Variant::TableScan, PlanType::FullScan, 1),
            result("1000/100", Variant::TableScan, PlanType::FullScan, 1),
            result("1000/100", Variant::Index, PlanType::IndexAccess, 1),
            result("10000/1000", Variant::Index, PlanType::IndexAccess, 1),
        ];
        let agg = aggregate(&results);
        let order: Vec<(String, Variant)> = agg
            .details
            .iter()
            .map(|r| (r.scenario_id.to_string(), r.variant))
            .collect();
        assert_eq!(
            order,
            vec![
                ("index_10K_1000".to_string(), Variant::Index),
                ("index_10K_1000".to_string(), Variant::TableScan),
                ("index_1K_100".to_string(), Variant::Index),
                ("index_1K_100".to_string(), Variant::TableScan),
            ]
        );
    }

    #[test]
    fn test_coverage_gap_and_split() {
        let results = vec![
            // Optimizer picks a full scan, but the scan variant was never run.
            result("1000/100", Variant::ExplainOnly, PlanType::FullScan, 0),
            result("1000/100", Variant::Index, PlanType::IndexAccess, 3),
            result("1000/20", Variant::ExplainOnly, PlanType::IndexAccess, 0),
            result("1000/20", Variant::Index, PlanType::IndexAccess, 1),
            result("1000/20", Variant::TableScan, PlanType::FullScan, 2),
        ];
        let agg = aggregate(&results);
        assert_eq!(agg.overall.coverage_gaps.len(), 1);
        assert_eq!(agg.overall.coverage_gaps[0].as_str(), "index_1K_100");
        assert_eq!(agg.overall.index_choice_pct, 50.0);
        assert_eq!(agg.overall.full_scan_choice_pct, 50.0);
        assert_eq!(agg.overall.comparable, 1);
        assert_eq!(agg.overall.chose_fastest, 1);
        assert_eq!(agg.overall.executed_runs, 3);
    }

    #[test]
    fn test_empty_input() {
        let agg = aggregate(&[]);
        assert!(agg.scenarios.is_empty());
        assert_eq!(agg.overall.index_choice_pct, 0.0);
    }
}
