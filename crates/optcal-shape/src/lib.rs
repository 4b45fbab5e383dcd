#![forbid(unsafe_code)]
//! optcal-shape: bring a table's predicate column to an exact distribution.
//!
//! No SQL lives here. The shaper drives a `PredicateTable`, which
//! `optcal-io` implements over a live connection. `MemoryTable` is the
//! in-process implementation used by tests.

pub mod bounce;
pub mod error;
pub mod memory;
pub mod shaper;
pub mod table;

pub use bounce::{bounce_value, BounceReport};
pub use error::{Result, ShapeError};
pub use memory::MemoryTable;
pub use shaper::{SelectivityShaper, ShapeOptions, ShapeReport};
pub use table::{Pick, Predicate, PredicateTable};
