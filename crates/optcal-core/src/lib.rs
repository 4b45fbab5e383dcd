#![forbid(unsafe_code)]
//! optcal-core: shared vocabulary of the calibration harness.
//!
//! Everything downstream crates exchange lives here: configuration, scenario
//! identifiers, selectivity specs, the normalized plan model and the per-run
//! execution result. No I/O, no async, no randomness in this crate.

pub mod config;
pub mod error;
pub mod id;
pub mod plan;
pub mod prelude;
pub mod result;
pub mod scenario;
pub mod selectivity;
pub mod units;

/// Harness version string, stamped into exported run documents.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{Error, Result};
