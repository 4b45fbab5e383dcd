//! Run counters, reported through `tracing` when the run ends.

use serde::Serialize;
use tracing::info;

use optcal_core::result::TestExecutionResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunMetrics {
    pub scenarios: usize,
    pub explained: usize,
    pub executed: usize,
    pub retried: usize,
    pub skipped: usize,
    pub tables_shaped: usize,
    pub shaping_updates: usize,
}

impl RunMetrics {
    pub fn record(&mut self, result: &TestExecutionResult) {
        if result.is_explain_only() {
            self.explained += 1;
        } else {
            self.executed += 1;
        }
        if result.retried {
            self.retried += 1;
        }
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn record_shaping(&mut self, updates: usize) {
        self.tables_shaped += 1;
        self.shaping_updates += updates;
    }

    pub fn emit(&self) {
        info!(
            scenarios = self.scenarios,
            explained = self.explained,
            executed = self.executed,
            retried = self.retried,
            skipped = self.skipped,
            tables_shaped = self.tables_shaped,
            shaping_updates = self.shaping_updates,
            "calibration run finished"
        );
    }
}
