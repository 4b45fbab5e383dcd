//! Convenient re-exports for downstream crates.

pub use crate::config::{CalibrationConfig, ConfigDocument, ConnectionConfig, PlanFormat};
pub use crate::error::{Error, Result};
pub use crate::id::{row_count_label, table_name, ScenarioId};
pub use crate::plan::{PlanNode, PlanType};
pub use crate::result::TestExecutionResult;
pub use crate::scenario::{TestScenario, Variant};
pub use crate::selectivity::{resolve_specs, Selectivity, SelectivitySpec};
