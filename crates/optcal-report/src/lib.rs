#![forbid(unsafe_code)]
//! optcal-report: group results by scenario id and render them.
//!
//! Nothing here depends on execution order; the detail table is re-sorted
//! by scenario id before rendering.

pub mod aggregate;
pub mod render;

pub use aggregate::{aggregate, Aggregation, OverallSummary, ScenarioSummary, TypeStats};
pub use render::{render_detail, render_overall, render_report, render_summary};
