//! Test scenarios: one query against one shaped table, tagged with the
//! access-path variant it exercises.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::id::ScenarioId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Variant {
    /// Unhinted query; only its static plan is inspected.
    ExplainOnly,
    /// Query forced onto the predicate index.
    Index,
    /// Query with the predicate index suppressed.
    TableScan,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::ExplainOnly => "ExplainOnly",
            Variant::Index => "Index",
            Variant::TableScan => "TableScan",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestScenario {
    pub id: ScenarioId,
    pub variant: Variant,
    pub name: String,
    pub query: String,
    pub table: String,
    pub row_count: u64,
    /// Predicate value, equal to the number of rows it matches.
    pub cardinality: u64,
    pub explain_only: bool,
}

impl TestScenario {
    pub fn is_executed(&self) -> bool {
        !self.explain_only
    }
}
