//! `PredicateTable` over a live SQL connection.

use tracing::debug;

use optcal_shape::{Pick, Predicate, PredicateTable, Result as ShapeResult, ShapeError};

use crate::client::SqlClient;
use crate::error::IoError;
use crate::statements;

fn backend(err: IoError) -> ShapeError {
    ShapeError::Backend(err.to_string())
}

pub struct SqlTable<C: SqlClient> {
    client: C,
    name: String,
    /// Cross-joined seed tables, set between `begin_bulk_load` and
    /// `end_bulk_load`.
    source: Option<String>,
}

impl<C: SqlClient> SqlTable<C> {
    pub fn new(client: C, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
            source: None,
        }
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    fn exec(&mut self, sql: &str) -> ShapeResult<u64> {
        self.client.exec(sql).map_err(backend)
    }

    fn count(&mut self, sql: &str) -> ShapeResult<u64> {
        match self.client.first_u64(sql).map_err(backend)? {
            Some(n) => Ok(n),
            None => Err(backend(IoError::NoRows(sql.to_string()))),
        }
    }
}

impl<C: SqlClient> PredicateTable for SqlTable<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn row_count(&mut self) -> ShapeResult<Option<u64>> {
        if self.count(&statements::table_exists(&self.name))? == 0 {
            return Ok(None);
        }
        let rows = self.count(&statements::count_all(&self.name))?;
        Ok(Some(rows))
    }

    fn recreate(&mut self) -> ShapeResult<()> {
        self.exec(&statements::drop_table(&self.name))?;
        self.exec(&statements::create_calibration_table(&self.name))?;
        Ok(())
    }

    fn begin_bulk_load(&mut self, batch_rows: u64) -> ShapeResult<()> {
        let seed = statements::seed_table(&self.name);
        self.exec(&statements::drop_table(&seed))?;
        self.exec(&statements::create_seed_table(&seed))?;
        self.exec(&statements::fill_seed_table(&seed))?;
        self.source = Some(statements::seed_source(&seed, batch_rows));
        debug!(table = %self.name, batch_rows, "bulk load started");
        Ok(())
    }

    fn append_random_rows(&mut self, rows: u64) -> ShapeResult<u64> {
        let source = self
            .source
            .clone()
            .ok_or_else(|| ShapeError::Backend("bulk load not started".into()))?;
        self.exec(&statements::insert_random_rows(&self.name, &source, rows))
    }

    fn end_bulk_load(&mut self) -> ShapeResult<()> {
        self.source = None;
        let seed = statements::seed_table(&self.name);
        self.exec(&statements::drop_table(&seed))?;
        Ok(())
    }

    fn count_where(&mut self, filter: &Predicate) -> ShapeResult<u64> {
        self.count(&statements::count_where(&self.name, filter))
    }

    fn reassign(
        &mut self,
        filter: &Predicate,
        value: i64,
        limit: u64,
        pick: Pick,
    ) -> ShapeResult<u64> {
        self.exec(&statements::reassign(&self.name, filter, value, limit, pick))
    }

    fn analyze(&mut self) -> ShapeResult<()> {
        self.exec(&statements::analyze(&self.name))?;
        Ok(())
    }
}
