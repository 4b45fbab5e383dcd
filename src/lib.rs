#![forbid(unsafe_code)]
//! optcal: calibrate a cost-based optimizer's choice between index access
//! and full table scan.
//!
//! The harness shapes tables so that chosen predicate values match exact row
//! counts, runs each predicate unhinted (plan only), forced onto the index
//! and forced onto a scan, then compares the optimizer's choice with the
//! measured timings.

pub use optcal_core;
pub use optcal_exec;
pub use optcal_io;
pub use optcal_plan;
pub use optcal_report;
pub use optcal_scenario;
pub use optcal_shape;
