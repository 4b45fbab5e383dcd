//! The executor's view of one connection.

use optcal_core::config::PlanFormat;
use optcal_plan::RawPlan;
use optcal_shape::PredicateTable;

use crate::client::SqlClient;
use crate::error::Result;
use crate::statements;
use crate::table::SqlTable;

pub trait Session {
    /// Shapeable handle on `name`, borrowing this session's connection.
    fn table(&mut self, name: &str) -> Box<dyn PredicateTable + '_>;

    /// Plan the server would use for `sql`, without running it.
    fn static_plan(&mut self, sql: &str) -> Result<RawPlan>;

    /// Run `sql`, returning how many rows it produced.
    fn run_counting(&mut self, sql: &str) -> Result<u64>;

    /// Executed plan of the last statement run through `run_counting`.
    fn last_plan(&mut self) -> Result<RawPlan>;
}

pub struct SqlSession<C: SqlClient> {
    client: C,
    format: PlanFormat,
}

impl<C: SqlClient> SqlSession<C> {
    pub fn new(client: C, format: PlanFormat) -> Self {
        Self { client, format }
    }

    pub fn client(&mut self) -> &mut C {
        &mut self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }
}

impl<C: SqlClient> Session for SqlSession<C> {
    fn table(&mut self, name: &str) -> Box<dyn PredicateTable + '_> {
        Box::new(SqlTable::new(&mut self.client, name))
    }

    fn static_plan(&mut self, sql: &str) -> Result<RawPlan> {
        let rows = self.client.text_rows(&statements::explain(sql, self.format))?;
        Ok(RawPlan::new(rows))
    }

    fn run_counting(&mut self, sql: &str) -> Result<u64> {
        self.client.count_rows(sql)
    }

    fn last_plan(&mut self) -> Result<RawPlan> {
        let id = self.client.connection_id();
        let rows = self
            .client
            .text_rows(&statements::explain_for_connection(id, self.format))?;
        Ok(RawPlan::new(rows))
    }
}
