//! Query text for each variant. Hints name the `idx_b` index of the
//! calibration table.

use optcal_core::scenario::Variant;

pub const INDEX_NAME: &str = "idx_b";

pub fn predicate_query(table: &str, value: i64, variant: Variant) -> String {
    match variant {
        Variant::ExplainOnly => format!("SELECT * FROM {table} WHERE b = {value}"),
        Variant::Index => format!(
            "SELECT /*+ FORCE_INDEX({table}, {INDEX_NAME}) */ * FROM {table} WHERE b = {value}"
        ),
        Variant::TableScan => format!(
            "SELECT /*+ IGNORE_INDEX({table}, {INDEX_NAME}) */ * FROM {table} WHERE b = {value}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hints() {
        assert_eq!(
            predicate_query("t1K", 100, Variant::ExplainOnly),
            "SELECT * FROM t1K WHERE b = 100"
        );
        assert_eq!(
            predicate_query("t1K", 100, Variant::Index),
            "SELECT /*+ FORCE_INDEX(t1K, idx_b) */ * FROM t1K WHERE b = 100"
        );
        assert_eq!(
            predicate_query("t1K", 100, Variant::TableScan),
            "SELECT /*+ IGNORE_INDEX(t1K, idx_b) */ * FROM t1K WHERE b = 100"
        );
    }
}
