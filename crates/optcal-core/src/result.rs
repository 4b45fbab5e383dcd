//! Outcome of running one scenario.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::id::ScenarioId;
use crate::plan::{PlanNode, PlanType};
use crate::scenario::Variant;

/// Created by the executor, consumed by the aggregator, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestExecutionResult {
    pub scenario_id: ScenarioId,
    pub variant: Variant,
    pub query: String,
    pub plan_type: PlanType,
    /// Zero for `ExplainOnly` results.
    pub duration: Duration,
    pub rows_returned: u64,
    /// Resource units reported by the executed plan, zero when absent.
    pub resource_cost: f64,
    /// True when a cache-contaminated first attempt was discarded.
    pub retried: bool,
    pub plan: Option<PlanNode>,
}

impl TestExecutionResult {
    pub fn is_explain_only(&self) -> bool {
        self.variant == Variant::ExplainOnly
    }
}
