//! Demonstration mode: a fixed table `t` and nine fixed queries whose plans
//! are printed, for eyeballing optimizer behaviour without a calibration run.

use serde::Serialize;
use tracing::info;

use optcal_core::config::PlanFormat;
use optcal_core::plan::PlanType;
use optcal_io::{statements, SqlClient};
use optcal_plan::{classify, parse_plan, RawPlan};

use crate::error::Result;

pub const DEMO_TABLE: &str = "t";
pub const DEMO_ROWS: u64 = 10_000;

/// Rows per multi-row insert.
const INSERT_BATCH: u64 = 1_000;

pub fn create_demo_table_sql() -> String {
    format!(
        "CREATE TABLE {DEMO_TABLE} (a BIGINT AUTO_INCREMENT PRIMARY KEY, b INT, c VARCHAR(255), \
         KEY idx_b (b), KEY idx_cb (c, b))"
    )
}

/// Insert rows `first..=last` of the fixed pattern `b = i % 100`,
/// `c = value_<i % 50>`.
pub fn demo_insert_sql(first: u64, last: u64) -> String {
    let values: Vec<String> = (first..=last)
        .map(|i| format!("({}, 'value_{}')", i % 100, i % 50))
        .collect();
    format!("INSERT INTO {DEMO_TABLE} (b, c) VALUES {}", values.join(", "))
}

/// Drop, create and populate `t`, then refresh statistics. Returns the
/// verified row count.
pub fn create_demo_table(client: &mut dyn SqlClient, rows: u64) -> Result<u64> {
    client.exec(&statements::drop_table(DEMO_TABLE))?;
    client.exec(&create_demo_table_sql())?;
    let mut first = 1;
    while first <= rows {
        let last = (first + INSERT_BATCH - 1).min(rows);
        client.exec(&demo_insert_sql(first, last))?;
        info!(inserted = last, rows, "populating demo table");
        first = last + 1;
    }
    client.exec(&statements::analyze(DEMO_TABLE))?;
    let count = client
        .first_u64(&statements::count_all(DEMO_TABLE))?
        .unwrap_or(0);
    Ok(count)
}

#[derive(Debug, Clone, Copy)]
pub struct DemoQuery {
    pub name: &'static str,
    pub sql: &'static str,
    pub expectation: &'static str,
}

pub const DEMO_QUERIES: [DemoQuery; 9] = [
    DemoQuery {
        name: "Full table scan",
        sql: "SELECT * FROM t",
        expectation: "TableFullScan, every column is needed",
    },
    DemoQuery {
        name: "Primary key point query",
        sql: "SELECT * FROM t WHERE a = 100",
        expectation: "Point_Get on the primary key",
    },
    DemoQuery {
        name: "Primary key range query",
        sql: "SELECT * FROM t WHERE a >= 100 AND a <= 200",
        expectation: "TableRangeScan on the primary key",
    },
    DemoQuery {
        name: "Index b point query",
        sql: "SELECT * FROM t WHERE b = 10",
        expectation: "IndexLookUp on idx_b, c needs a table lookup",
    },
    DemoQuery {
        name: "Index b covering query",
        sql: "SELECT a, b FROM t WHERE b = 10",
        expectation: "IndexReader on idx_b",
    },
    DemoQuery {
        name: "Composite index query",
        sql: "SELECT * FROM t WHERE c = 'value_10'",
        expectation: "IndexLookUp on idx_cb",
    },
    DemoQuery {
        name: "Composite index covering query",
        sql: "SELECT c, b FROM t WHERE c = 'value_10'",
        expectation: "IndexReader on idx_cb",
    },
    DemoQuery {
        name: "Non-selective query",
        sql: "SELECT * FROM t WHERE b > 50",
        expectation: "TableFullScan when selectivity is low",
    },
    DemoQuery {
        name: "Highly selective query",
        sql: "SELECT * FROM t WHERE b = 1",
        expectation: "IndexLookUp on idx_b",
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct DemoOutcome {
    pub name: &'static str,
    pub sql: &'static str,
    pub expectation: &'static str,
    pub plan: Vec<Vec<String>>,
    pub analyzed: Vec<Vec<String>>,
    /// `None` when the static plan could not be parsed.
    pub plan_type: Option<PlanType>,
}

/// Run every demo query through `EXPLAIN` and `EXPLAIN ANALYZE`.
pub fn run_demo_queries(client: &mut dyn SqlClient, format: PlanFormat) -> Result<Vec<DemoOutcome>> {
    DEMO_QUERIES
        .iter()
        .map(|q| {
            let plan = client.text_rows(&statements::explain(q.sql, format))?;
            let analyzed = client.text_rows(&statements::explain_analyze(q.sql))?;
            let plan_type = parse_plan(&RawPlan::new(plan.clone()))
                .ok()
                .map(|node| classify(&node));
            Ok(DemoOutcome {
                name: q.name,
                sql: q.sql,
                expectation: q.expectation,
                plan,
                analyzed,
                plan_type,
            })
        })
        .collect()
}
