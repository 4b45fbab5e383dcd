//! The seam between the shaper and whatever stores the rows.

use std::fmt;

use crate::error::Result;

/// Row filter over the predicate column `b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Equals(i64),
    /// `b <= 0`: rows not yet assigned a value.
    NonPositive,
    /// Rows whose value is none of the listed ones.
    NoneOf(Vec<i64>),
}

impl Predicate {
    pub fn matches(&self, b: i64) -> bool {
        match self {
            Predicate::Equals(v) => b == *v,
            Predicate::NonPositive => b <= 0,
            Predicate::NoneOf(values) => !values.contains(&b),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Equals(v) => write!(f, "b = {v}"),
            Predicate::NonPositive => f.write_str("b <= 0"),
            Predicate::NoneOf(values) if values.is_empty() => f.write_str("TRUE"),
            Predicate::NoneOf(values) => {
                f.write_str("b NOT IN (")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Which matching rows an update touches when it is limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    Any,
    Random,
}

/// A table `(id auto-increment, b int, filler)` that can be recreated,
/// bulk-loaded, counted and updated in bounded batches.
pub trait PredicateTable {
    fn name(&self) -> &str;

    /// `None` when the table does not exist.
    fn row_count(&mut self) -> Result<Option<u64>>;

    /// Drop (if present) and create the table empty.
    fn recreate(&mut self) -> Result<()>;

    /// Prepare whatever row source `append_random_rows` needs for batches of
    /// up to `batch_rows`.
    fn begin_bulk_load(&mut self, batch_rows: u64) -> Result<()>;

    /// Insert up to `rows` rows with random `b` in `[0, 1_000_000)`.
    /// Returns the number inserted.
    fn append_random_rows(&mut self, rows: u64) -> Result<u64>;

    /// Release the bulk-load row source. Idempotent.
    fn end_bulk_load(&mut self) -> Result<()>;

    fn count_where(&mut self, filter: &Predicate) -> Result<u64>;

    /// Set `b = value` on at most `limit` rows matching `filter`.
    /// Returns the number of rows changed.
    fn reassign(&mut self, filter: &Predicate, value: i64, limit: u64, pick: Pick)
        -> Result<u64>;

    /// Refresh optimizer statistics.
    fn analyze(&mut self) -> Result<()>;
}

impl<T: PredicateTable + ?Sized> PredicateTable for &mut T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn row_count(&mut self) -> Result<Option<u64>> {
        (**self).row_count()
    }

    fn recreate(&mut self) -> Result<()> {
        (**self).recreate()
    }

    fn begin_bulk_load(&mut self, batch_rows: u64) -> Result<()> {
        (**self).begin_bulk_load(batch_rows)
    }

    fn append_random_rows(&mut self, rows: u64) -> Result<u64> {
        (**self).append_random_rows(rows)
    }

    fn end_bulk_load(&mut self) -> Result<()> {
        (**self).end_bulk_load()
    }

    fn count_where(&mut self, filter: &Predicate) -> Result<u64> {
        (**self).count_where(filter)
    }

    fn reassign(
        &mut self,
        filter: &Predicate,
        value: i64,
        limit: u64,
        pick: Pick,
    ) -> Result<u64> {
        (**self).reassign(filter, value, limit, pick)
    }

    fn analyze(&mut self) -> Result<()> {
        (**self).analyze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicate_sql_text() {
        assert_eq!(Predicate::Equals(100).to_string(), "b = 100");
        assert_eq!(Predicate::NonPositive.to_string(), "b <= 0");
        assert_eq!(Predicate::NoneOf(vec![20, 100]).to_string(), "b NOT IN (20,100)");
        assert_eq!(Predicate::NoneOf(vec![]).to_string(), "TRUE");
    }

    #[test]
    fn test_predicate_matches() {
        assert!(Predicate::NonPositive.matches(0));
        assert!(Predicate::NonPositive.matches(-4));
        assert!(!Predicate::NonPositive.matches(1));
        assert!(Predicate::NoneOf(vec![1, 2]).matches(3));
        assert!(!Predicate::NoneOf(vec![1, 2]).matches(2));
    }
}
