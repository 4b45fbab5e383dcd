//! SQL text builders.
//!
//! Table names are generated by the harness (`t1K`, `t`), never taken from
//! user input, so they are spliced in unquoted.

use optcal_core::config::PlanFormat;
use optcal_shape::{Pick, Predicate};

/// Rows in the bulk-load seed table.
pub const SEED_ROWS: u64 = 10;

pub fn create_calibration_table(table: &str) -> String {
    format!(
        "CREATE TABLE {table} (id BIGINT AUTO_INCREMENT PRIMARY KEY, b INT, \
         filler VARCHAR(255), KEY idx_b (b))"
    )
}

pub fn drop_table(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {table}")
}

pub fn table_exists(table: &str) -> String {
    format!(
        "SELECT COUNT(*) FROM information_schema.tables \
         WHERE table_schema = DATABASE() AND table_name = '{}'",
        table.replace('\'', "''")
    )
}

pub fn count_all(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {table}")
}

pub fn count_where(table: &str, filter: &Predicate) -> String {
    format!("SELECT COUNT(*) FROM {table} WHERE {filter}")
}

pub fn reassign(table: &str, filter: &Predicate, value: i64, limit: u64, pick: Pick) -> String {
    let order = match pick {
        Pick::Any => "",
        Pick::Random => " ORDER BY RAND()",
    };
    format!("UPDATE {table} SET b = {value} WHERE {filter}{order} LIMIT {limit}")
}

pub fn analyze(table: &str) -> String {
    format!("ANALYZE TABLE {table}")
}

pub fn seed_table(table: &str) -> String {
    format!("tmp_{table}")
}

pub fn create_seed_table(seed: &str) -> String {
    format!("CREATE TABLE {seed} (a INT PRIMARY KEY)")
}

pub fn fill_seed_table(seed: &str) -> String {
    let values: Vec<String> = (1..=SEED_ROWS).map(|v| format!("({v})")).collect();
    format!("INSERT INTO {seed} (a) VALUES {}", values.join(","))
}

/// The seed table cross-joined with itself until it yields at least
/// `batch_rows` rows.
pub fn seed_source(seed: &str, batch_rows: u64) -> String {
    let mut copies = 1;
    let mut rows = SEED_ROWS;
    while rows < batch_rows {
        rows = rows.saturating_mul(SEED_ROWS);
        copies += 1;
    }
    let mut source = seed.to_string();
    for i in 1..copies {
        source.push_str(&format!(", {seed} s{i}"));
    }
    source
}

pub fn insert_random_rows(table: &str, source: &str, rows: u64) -> String {
    format!(
        "INSERT INTO {table} (b, filler) \
         SELECT FLOOR(RAND() * 1000000), RAND() * 1000000000 FROM {source} LIMIT {rows}"
    )
}

fn format_clause(format: PlanFormat) -> &'static str {
    match format {
        PlanFormat::Brief => "FORMAT='brief'",
        PlanFormat::Json => "FORMAT='tidb_json'",
    }
}

/// Static plan of `sql`, without running it.
pub fn explain(sql: &str, format: PlanFormat) -> String {
    format!("EXPLAIN {} {sql}", format_clause(format))
}

/// Executed plan of the last statement run on connection `id`.
pub fn explain_for_connection(id: u32, format: PlanFormat) -> String {
    format!("EXPLAIN {} FOR CONNECTION {id}", format_clause(format))
}

pub fn explain_analyze(sql: &str) -> String {
    format!("EXPLAIN ANALYZE {sql}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_source_grows_with_batch() {
        assert_eq!(seed_source("tmp_t1K", 10), "tmp_t1K");
        assert_eq!(seed_source("tmp_t1K", 11), "tmp_t1K, tmp_t1K s1");
        assert_eq!(
            seed_source("tmp_t1K", 100_000),
            "tmp_t1K, tmp_t1K s1, tmp_t1K s2, tmp_t1K s3, tmp_t1K s4"
        );
    }

    #[test]
    fn test_reassign_text() {
        assert_eq!(
            reassign("t1K", &Predicate::Equals(100), 7, 50, Pick::Random),
            "UPDATE t1K SET b = 7 WHERE b = 100 ORDER BY RAND() LIMIT 50"
        );
        assert_eq!(
            reassign("t1K", &Predicate::NonPositive, 3, 10, Pick::Any),
            "UPDATE t1K SET b = 3 WHERE b <= 0 LIMIT 10"
        );
        assert_eq!(
            reassign("t1K", &Predicate::NoneOf(vec![20, 100]), 100, 5, Pick::Random),
            "UPDATE t1K SET b = 100 WHERE b NOT IN (20,100) ORDER BY RAND() LIMIT 5"
        );
    }

    #[test]
    fn test_explain_forms() {
        assert_eq!(
            explain("SELECT * FROM t1K WHERE b = 100", PlanFormat::Brief),
            "EXPLAIN FORMAT='brief' SELECT * FROM t1K WHERE b = 100"
        );
        assert_eq!(
            explain_for_connection(42, PlanFormat::Json),
            "EXPLAIN FORMAT='tidb_json' FOR CONNECTION 42"
        );
    }

    #[test]
    fn test_table_exists_escapes_name() {
        assert!(table_exists("o'brien").contains("'o''brien'"));
    }

    #[test]
    fn test_seed_fill() {
        assert_eq!(
            fill_seed_table("tmp_t"),
            "INSERT INTO tmp_t (a) VALUES (1),(2),(3),(4),(5),(6),(7),(8),(9),(10)"
        );
    }
}
