//! SelectivityShaper: make every requested cardinality value of `b` match
//! exactly that many rows while keeping the row count fixed.
//!
//! Steps:
//! 1. recreate and bulk-populate when the table is missing or mis-sized
//! 2. move unassigned (`b <= 0`) rows to non-reserved values
//! 3. trim every over-populated value, then grow every short one
//! 4. verify and refresh statistics
//!
//! Trimming everything before growing anything keeps the unreserved pool
//! large enough: with `Σ cardinality < rows` the pool always holds at least
//! the total shortfall.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use optcal_core::config::CalibrationConfig;
use optcal_core::selectivity::SelectivitySpec;

use crate::error::{Result, ShapeError};
use crate::table::{Pick, Predicate, PredicateTable};

/// Upper bound (inclusive) of filler values.
pub const FILLER_MAX: i64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeOptions {
    pub populate_batch_rows: u64,
    pub shape_batch_rows: u64,
    pub max_iterations: Option<usize>,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        Self::from(&CalibrationConfig::default())
    }
}

impl From<&CalibrationConfig> for ShapeOptions {
    fn from(cfg: &CalibrationConfig) -> Self {
        Self {
            populate_batch_rows: cfg.populate_batch_rows.max(1),
            shape_batch_rows: cfg.shape_batch_rows.max(1),
            max_iterations: cfg.max_iterations,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShapeReport {
    pub table: String,
    pub recreated: bool,
    pub inserted_rows: u64,
    /// Rows moved off the `b <= 0` sentinel.
    pub normalized_rows: u64,
    /// Mutating statements issued (inserts and updates).
    pub updates: usize,
    /// `(value, rows)` pairs as verified after shaping.
    pub verified: Vec<(i64, u64)>,
}

/// Counts the iterations of one batch loop against the configured cap.
pub(crate) struct IterationBudget<'a> {
    table: &'a str,
    value: i64,
    cap: Option<usize>,
    used: usize,
}

impl<'a> IterationBudget<'a> {
    pub(crate) fn new(table: &'a str, value: i64, cap: Option<usize>) -> Self {
        Self {
            table,
            value,
            cap,
            used: 0,
        }
    }

    pub(crate) fn tick(&mut self) -> Result<()> {
        self.used += 1;
        match self.cap {
            Some(cap) if self.used > cap => Err(ShapeError::ConvergenceFailed {
                table: self.table.to_string(),
                value: self.value,
                iterations: cap,
            }),
            _ => Ok(()),
        }
    }
}

pub struct SelectivityShaper {
    options: ShapeOptions,
    rng: StdRng,
}

impl SelectivityShaper {
    /// `seed` makes filler values reproducible; `None` seeds from entropy.
    pub fn new(options: ShapeOptions, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { options, rng }
    }

    pub fn options(&self) -> &ShapeOptions {
        &self.options
    }

    pub fn shape(
        &mut self,
        table: &mut dyn PredicateTable,
        rows: u64,
        specs: &[SelectivitySpec],
    ) -> Result<ShapeReport> {
        let reserved = check_specs(table.name(), rows, specs)?;
        let name = table.name().to_string();
        let mut report = ShapeReport {
            table: name.clone(),
            ..Default::default()
        };

        let existing = table.row_count()?;
        if existing != Some(rows) {
            info!(table = %name, ?existing, rows, "recreating table");
            self.populate(table, rows, &mut report)?;
        }

        self.normalize(table, &reserved, &mut report)?;

        for spec in specs {
            self.trim(table, spec, &reserved, &mut report)?;
        }
        for spec in specs {
            self.grow(table, spec, &reserved, &mut report)?;
        }

        for spec in specs {
            let value = spec.value();
            let actual = table.count_where(&Predicate::Equals(value))?;
            if actual != spec.cardinality {
                return Err(ShapeError::VerificationFailed {
                    table: name,
                    value,
                    expected: spec.cardinality,
                    actual,
                });
            }
            if !report.verified.iter().any(|(v, _)| *v == value) {
                report.verified.push((value, actual));
            }
        }
        let total = table.row_count()?.unwrap_or(0);
        if total != rows {
            return Err(ShapeError::RowCountMismatch {
                table: name,
                expected: rows,
                actual: total,
            });
        }

        table.analyze()?;
        info!(
            table = %report.table,
            updates = report.updates,
            recreated = report.recreated,
            "selectivities shaped"
        );
        Ok(report)
    }

    fn populate(
        &mut self,
        table: &mut dyn PredicateTable,
        rows: u64,
        report: &mut ShapeReport,
    ) -> Result<()> {
        table.recreate()?;
        report.recreated = true;
        table.begin_bulk_load(self.options.populate_batch_rows)?;
        let filled = self.fill(table, rows, report);
        let released = table.end_bulk_load();
        filled?;
        released?;

        let actual = table.row_count()?.unwrap_or(0);
        if actual != rows {
            return Err(ShapeError::RowCountMismatch {
                table: table.name().to_string(),
                expected: rows,
                actual,
            });
        }
        table.analyze()
    }

    fn fill(
        &mut self,
        table: &mut dyn PredicateTable,
        rows: u64,
        report: &mut ShapeReport,
    ) -> Result<()> {
        let name = table.name().to_string();
        let mut budget = IterationBudget::new(&name, 0, self.options.max_iterations);
        let mut current = table.row_count()?.unwrap_or(0);
        while current < rows {
            budget.tick()?;
            let batch = self.options.populate_batch_rows.min(rows - current);
            let inserted = table.append_random_rows(batch)?;
            report.updates += 1;
            report.inserted_rows += inserted;
            if inserted == 0 {
                return Err(ShapeError::NoProgress {
                    table: name,
                    value: 0,
                });
            }
            current = table.row_count()?.unwrap_or(0);
            debug!(table = %name, current, rows, "populated batch");
        }
        Ok(())
    }

    fn normalize(
        &mut self,
        table: &mut dyn PredicateTable,
        reserved: &BTreeSet<i64>,
        report: &mut ShapeReport,
    ) -> Result<()> {
        let name = table.name().to_string();
        let mut budget = IterationBudget::new(&name, 0, self.options.max_iterations);
        loop {
            let remaining = table.count_where(&Predicate::NonPositive)?;
            if remaining == 0 {
                return Ok(());
            }
            budget.tick()?;
            let value = self.filler(reserved);
            let limit = self.options.shape_batch_rows.min(remaining);
            let moved = table.reassign(&Predicate::NonPositive, value, limit, Pick::Any)?;
            report.updates += 1;
            report.normalized_rows += moved;
            if moved == 0 {
                return Err(ShapeError::NoProgress { table: name, value });
            }
        }
    }

    fn trim(
        &mut self,
        table: &mut dyn PredicateTable,
        spec: &SelectivitySpec,
        reserved: &BTreeSet<i64>,
        report: &mut ShapeReport,
    ) -> Result<()> {
        let name = table.name().to_string();
        let target = spec.value();
        let filter = Predicate::Equals(target);
        let mut budget = IterationBudget::new(&name, target, self.options.max_iterations);
        let mut count = table.count_where(&filter)?;
        while count > spec.cardinality {
            budget.tick()?;
            let value = self.filler(reserved);
            let limit = self.options.shape_batch_rows.min(count - spec.cardinality);
            let moved = table.reassign(&filter, value, limit, Pick::Random)?;
            report.updates += 1;
            if moved == 0 {
                return Err(ShapeError::NoProgress { table: name, value });
            }
            count = table.count_where(&filter)?;
            debug!(table = %name, value = target, count, "trimmed");
        }
        Ok(())
    }

    fn grow(
        &mut self,
        table: &mut dyn PredicateTable,
        spec: &SelectivitySpec,
        reserved: &BTreeSet<i64>,
        report: &mut ShapeReport,
    ) -> Result<()> {
        let name = table.name().to_string();
        let target = spec.value();
        let filter = Predicate::Equals(target);
        let pool = Predicate::NoneOf(reserved.iter().copied().collect());
        let mut budget = IterationBudget::new(&name, target, self.options.max_iterations);
        let mut count = table.count_where(&filter)?;
        while count < spec.cardinality {
            budget.tick()?;
            let limit = self.options.shape_batch_rows.min(spec.cardinality - count);
            let moved = table.reassign(&pool, target, limit, Pick::Random)?;
            report.updates += 1;
            if moved == 0 {
                return Err(ShapeError::NoProgress {
                    table: name,
                    value: target,
                });
            }
            count = table.count_where(&filter)?;
            debug!(table = %name, value = target, count, "grew");
        }
        Ok(())
    }

    /// A value in `[1, FILLER_MAX]` that is not reserved.
    fn filler(&mut self, reserved: &BTreeSet<i64>) -> i64 {
        for _ in 0..64 {
            let v = self.rng.gen_range(1..=FILLER_MAX);
            if !reserved.contains(&v) {
                return v;
            }
        }
        // Reserved values crowd the range; take the first free one above it.
        (FILLER_MAX + 1..)
            .find(|v| !reserved.contains(v))
            .unwrap_or(FILLER_MAX + 1)
    }
}

/// Reject spec sets that can never be satisfied, before anything is touched.
fn check_specs(table: &str, rows: u64, specs: &[SelectivitySpec]) -> Result<BTreeSet<i64>> {
    let invalid = |reason: String| {
        ShapeError::Config(optcal_core::Error::Config(format!("table {table}: {reason}")))
    };
    if specs.is_empty() {
        return Err(invalid("no selectivities to shape".into()));
    }
    let mut reserved = BTreeSet::new();
    let mut total = 0u64;
    for spec in specs {
        if spec.rows != rows {
            return Err(invalid(format!(
                "selectivity for {} rows applied to a {rows}-row table",
                spec.rows
            )));
        }
        if spec.cardinality == 0 {
            return Err(invalid("zero-row selectivity".into()));
        }
        reserved.insert(spec.value());
        total = total.saturating_add(spec.cardinality);
    }
    if total >= rows {
        return Err(ShapeError::Config(optcal_core::Error::CardinalityOverflow {
            table: table.to_string(),
            rows,
            requested: total,
        }));
    }
    Ok(reserved)
}
