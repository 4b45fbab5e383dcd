#![forbid(unsafe_code)]
//! optcal-exec: run scenarios against a `Session` and collect results.
//!
//! Execution is strictly sequential on one session. The only state shared
//! between scenarios is the executor's table cache, which is append-only.

pub mod demo;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod runner;

pub use error::{ExecError, Result};
pub use executor::{Executor, TableCache};
pub use metrics::RunMetrics;
pub use runner::{run_calibration, RunSummary, ScenarioFailure};
