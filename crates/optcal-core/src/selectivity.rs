//! Selectivities and the per-table cardinality targets derived from them.
//!
//! A selectivity below 1 is a fraction of the table (`round(rows × s)` rows),
//! anything at or above 1 is an absolute row count. The resolved cardinality
//! doubles as the predicate value that is shaped, so `b = 100` matches
//! exactly 100 rows.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::id::table_name;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum Selectivity {
    /// Fraction of the table, `0 < s < 1`.
    Ratio(f64),
    /// Absolute number of matching rows.
    Absolute(u64),
}

impl Selectivity {
    /// Number of rows this selectivity asks for in a table of `rows` rows.
    pub fn cardinality(self, rows: u64) -> u64 {
        match self {
            Selectivity::Ratio(s) => (rows as f64 * s).round() as u64,
            Selectivity::Absolute(n) => n,
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Selectivity::Ratio(s) => s,
            Selectivity::Absolute(n) => n as f64,
        }
    }
}

impl TryFrom<f64> for Selectivity {
    type Error = Error;

    fn try_from(v: f64) -> Result<Self> {
        let invalid = |reason: &str| Error::Selectivity {
            input: v.to_string(),
            reason: reason.to_string(),
        };
        if !v.is_finite() || v <= 0.0 {
            return Err(invalid("must be a positive number"));
        }
        if v < 1.0 {
            return Ok(Selectivity::Ratio(v));
        }
        if v.fract() != 0.0 {
            return Err(invalid("absolute cardinalities must be whole numbers"));
        }
        Ok(Selectivity::Absolute(v as u64))
    }
}

impl From<Selectivity> for f64 {
    fn from(s: Selectivity) -> Self {
        s.value()
    }
}

impl fmt::Display for Selectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selectivity::Ratio(s) => write!(f, "{s}"),
            Selectivity::Absolute(n) => write!(f, "{n} rows"),
        }
    }
}

/// Largest value the predicate column (`b INT`) can store.
pub const MAX_PREDICATE_VALUE: u64 = i32::MAX as u64;

/// One shaping target: `cardinality` rows of a `rows`-row table must carry
/// the predicate value `cardinality`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectivitySpec {
    pub rows: u64,
    pub cardinality: u64,
}

impl SelectivitySpec {
    pub fn new(rows: u64, selectivity: Selectivity) -> Self {
        Self {
            rows,
            cardinality: selectivity.cardinality(rows),
        }
    }

    /// Predicate value shaped for this spec.
    pub fn value(&self) -> i64 {
        self.cardinality as i64
    }
}

/// Resolve all selectivities against one table size.
///
/// Specs keep input order, one per selectivity. Selectivities resolving to
/// the same cardinality share a predicate value but each still counts
/// towards the table's budget. Fails when any spec resolves to zero rows,
/// to a value the `b INT` column cannot hold, or when all cardinalities
/// add up to the table size or more.
pub fn resolve_specs(rows: u64, selectivities: &[Selectivity]) -> Result<Vec<SelectivitySpec>> {
    if selectivities.is_empty() {
        return Err(Error::Config("no selectivities given".into()));
    }
    if rows == 0 {
        return Err(Error::RowCount {
            input: "0".into(),
            reason: "tables need at least one row".into(),
        });
    }

    let mut specs: Vec<SelectivitySpec> = Vec::with_capacity(selectivities.len());
    for sel in selectivities {
        let spec = SelectivitySpec::new(rows, *sel);
        if spec.cardinality == 0 {
            return Err(Error::Selectivity {
                input: sel.value().to_string(),
                reason: format!("resolves to zero rows in a {rows}-row table"),
            });
        }
        if spec.cardinality > MAX_PREDICATE_VALUE {
            return Err(Error::Selectivity {
                input: sel.value().to_string(),
                reason: format!(
                    "resolves to {} rows, above the largest predicate value {MAX_PREDICATE_VALUE}",
                    spec.cardinality
                ),
            });
        }
        specs.push(spec);
    }

    let requested = specs
        .iter()
        .try_fold(0u64, |acc, s| acc.checked_add(s.cardinality))
        .unwrap_or(u64::MAX);
    if requested >= rows {
        return Err(Error::CardinalityOverflow {
            table: table_name(rows),
            rows,
            requested,
        });
    }
    Ok(specs)
}
