#![forbid(unsafe_code)]
//! optcal-scenario: the (row count × selectivity × variant) test matrix.

pub mod generator;
pub mod query;

pub use generator::{table_plans, ScenarioGenerator, TablePlan};
pub use query::{predicate_query, INDEX_NAME};
