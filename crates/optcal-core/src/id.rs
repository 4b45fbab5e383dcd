//! Scenario identifiers and table naming.
//!
//! Ids are pure functions of (table size, target cardinality) so that the
//! `ExplainOnly`, `Index` and `TableScan` variants of one scenario can be
//! re-joined after a shuffled run.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(String);

impl ScenarioId {
    pub fn new(rows: u64, cardinality: u64) -> Self {
        Self(format!("index_{}_{}", row_count_label(rows), cardinality))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Short size label: `1000 → 1K`, `2_000_000 → 2M`, `1500 → 1500`.
///
/// A suffix is only used for exact multiples, which keeps labels injective.
pub fn row_count_label(rows: u64) -> String {
    const UNITS: [(u64, &str); 3] = [(1_000_000_000, "G"), (1_000_000, "M"), (1_000, "K")];
    for (factor, suffix) in UNITS {
        if rows >= factor && rows % factor == 0 {
            return format!("{}{}", rows / factor, suffix);
        }
    }
    rows.to_string()
}

/// Calibration table holding `rows` rows.
pub fn table_name(rows: u64) -> String {
    format!("t{}", row_count_label(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(row_count_label(1000), "1K");
        assert_eq!(row_count_label(100_000), "100K");
        assert_eq!(row_count_label(1_000_000), "1M");
        assert_eq!(row_count_label(3_000_000_000), "3G");
        assert_eq!(row_count_label(2_500_000), "2500K");
        assert_eq!(row_count_label(1500), "1500");
        assert_eq!(row_count_label(999), "999");
    }

    #[test]
    fn test_ids_are_stable() {
        assert_eq!(ScenarioId::new(1000, 100).as_str(), "index_1K_100");
        assert_eq!(ScenarioId::new(1000, 100), ScenarioId::new(1000, 100));
        assert_eq!(table_name(10_000), "t10K");
    }
}
