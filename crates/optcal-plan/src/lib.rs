#![forbid(unsafe_code)]
//! optcal-plan: raw plan responses → normalized `PlanNode` trees → coarse
//! access-path classification.
//!
//! Design:
//! - The plan model itself lives in `optcal-core::plan` so results can carry
//!   it without depending on the parser.
//! - This crate adds:
//!     * shape detection over raw rows (`parse`)
//!     * the two tabular decoders (`tabular`) and the JSON decoder (`json`)
//!     * the lexical classifier (`classify`)
//!     * telemetry extraction from execution info (`telemetry`)

pub mod classify;
pub mod error;
pub mod json;
pub mod numeric;
pub mod parse;
pub mod tabular;
pub mod telemetry;

pub use classify::classify;
pub use error::{ParseError, Result};
pub use optcal_core::plan::{PlanNode, PlanType};
pub use parse::{detect_shape, parse_plan, PlanShape, RawPlan};
pub use telemetry::{cache_hit_ratio, is_contaminated, resource_cost};
