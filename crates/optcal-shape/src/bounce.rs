//! Result-cache invalidation by moving a value away and back.
//!
//! Rows at `value` are moved to `-value` and then back. Targets are always
//! positive and shaping leaves no row at or below zero, so `-value` is
//! disjoint from everything else in the table. Each direction loops in
//! bounded batches until nothing is left at its source.

use tracing::debug;

use crate::error::{Result, ShapeError};
use crate::shaper::{IterationBudget, ShapeOptions};
use crate::table::{Pick, Predicate, PredicateTable};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BounceReport {
    /// Rows moved to the transitional value (and back).
    pub rows: u64,
    pub updates: usize,
}

pub fn bounce_value(
    table: &mut dyn PredicateTable,
    value: i64,
    options: &ShapeOptions,
) -> Result<BounceReport> {
    if value <= 0 {
        return Err(ShapeError::Config(optcal_core::Error::Config(format!(
            "cannot bounce non-positive value {value}"
        ))));
    }
    let mut updates = 0;
    let rows = move_all(table, value, -value, options, &mut updates)?;
    let back = move_all(table, -value, value, options, &mut updates)?;
    if back != rows {
        return Err(ShapeError::VerificationFailed {
            table: table.name().to_string(),
            value,
            expected: rows,
            actual: back,
        });
    }
    debug!(table = %table.name(), value, rows, "bounced value");
    Ok(BounceReport { rows, updates })
}

fn move_all(
    table: &mut dyn PredicateTable,
    from: i64,
    to: i64,
    options: &ShapeOptions,
    updates: &mut usize,
) -> Result<u64> {
    let name = table.name().to_string();
    let filter = Predicate::Equals(from);
    let mut budget = IterationBudget::new(&name, from, options.max_iterations);
    let mut moved = 0;
    loop {
        let remaining = table.count_where(&filter)?;
        if remaining == 0 {
            return Ok(moved);
        }
        budget.tick()?;
        let limit = options.shape_batch_rows.min(remaining);
        let changed = table.reassign(&filter, to, limit, Pick::Any)?;
        *updates += 1;
        if changed == 0 {
            return Err(ShapeError::NoProgress {
                table: name,
                value: to,
            });
        }
        moved += changed;
    }
}
