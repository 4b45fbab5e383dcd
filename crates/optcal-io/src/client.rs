//! Blocking SQL client over one MySQL-protocol connection.
//!
//! The harness is strictly sequential, so the async driver is run on a
//! private current-thread runtime and every call blocks until done.

use mysql_async::prelude::Queryable;
use mysql_async::{Conn, OptsBuilder, Row, Value};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use optcal_core::config::ConnectionConfig;

use crate::error::{IoError, Result};

/// The "execute / fetch rows" contract the harness needs from a connection.
pub trait SqlClient {
    /// Run a statement and return the number of affected rows.
    fn exec(&mut self, sql: &str) -> Result<u64>;

    /// Run a query and count its rows without keeping them.
    fn count_rows(&mut self, sql: &str) -> Result<u64>;

    /// First column of the first row as an unsigned integer.
    fn first_u64(&mut self, sql: &str) -> Result<Option<u64>>;

    /// Every cell of every row rendered as text. `NULL` renders empty.
    fn text_rows(&mut self, sql: &str) -> Result<Vec<Vec<String>>>;

    /// Server-side id of this connection.
    fn connection_id(&self) -> u32;
}

impl<C: SqlClient + ?Sized> SqlClient for &mut C {
    fn exec(&mut self, sql: &str) -> Result<u64> {
        (**self).exec(sql)
    }

    fn count_rows(&mut self, sql: &str) -> Result<u64> {
        (**self).count_rows(sql)
    }

    fn first_u64(&mut self, sql: &str) -> Result<Option<u64>> {
        (**self).first_u64(sql)
    }

    fn text_rows(&mut self, sql: &str) -> Result<Vec<Vec<String>>> {
        (**self).text_rows(sql)
    }

    fn connection_id(&self) -> u32 {
        (**self).connection_id()
    }
}

pub struct MySqlClient {
    runtime: Runtime,
    conn: Option<Conn>,
    id: u32,
}

impl MySqlClient {
    /// Open, ping and identify the connection. The configured timeout bounds
    /// the whole handshake.
    pub fn connect(cfg: &ConnectionConfig) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| IoError::Runtime(e.to_string()))?;

        let addr = format!("{}:{}", cfg.host, cfg.port);
        let opts = OptsBuilder::default()
            .ip_or_hostname(cfg.host.clone())
            .tcp_port(cfg.port)
            .user(Some(cfg.user.clone()))
            .pass(Some(cfg.password.clone()))
            .db_name(Some(cfg.database.clone()));

        debug!(%addr, database = %cfg.database, "connecting");
        let timeout = cfg.timeout();
        let conn = runtime.block_on(async {
            let handshake = async {
                let mut conn = Conn::new(opts).await?;
                conn.ping().await?;
                Ok::<_, mysql_async::Error>(conn)
            };
            match tokio::time::timeout(timeout, handshake).await {
                Ok(Ok(conn)) => Ok(conn),
                Ok(Err(source)) => Err(IoError::Connect {
                    addr: addr.clone(),
                    source,
                }),
                Err(_) => Err(IoError::ConnectTimeout {
                    addr: addr.clone(),
                    secs: timeout.as_secs(),
                }),
            }
        })?;
        let id = conn.id();
        debug!(%addr, connection_id = id, "connected");

        Ok(Self {
            runtime,
            conn: Some(conn),
            id,
        })
    }

    pub fn close(mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            self.runtime
                .block_on(conn.disconnect())
                .map_err(|source| IoError::Query {
                    sql: "<disconnect>".into(),
                    source,
                })?;
        }
        Ok(())
    }
}

fn query_error(sql: &str) -> impl FnOnce(mysql_async::Error) -> IoError + '_ {
    move |source| IoError::Query {
        sql: sql.to_string(),
        source,
    }
}

/// Text rendering of one cell, the way the server would print it.
fn cell_text(value: &Value) -> String {
    match value {
        Value::NULL => String::new(),
        Value::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Value::Int(v) => v.to_string(),
        Value::UInt(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        other => other.as_sql(true).trim_matches('\'').to_string(),
    }
}

fn row_text(row: &Row) -> Vec<String> {
    (0..row.len())
        .map(|i| row.as_ref(i).map(cell_text).unwrap_or_default())
        .collect()
}

impl SqlClient for MySqlClient {
    fn exec(&mut self, sql: &str) -> Result<u64> {
        debug!(sql, "exec");
        let conn = self.conn.as_mut().ok_or(IoError::Closed)?;
        self.runtime.block_on(async {
            conn.query_drop(sql).await.map_err(query_error(sql))?;
            Ok(conn.affected_rows())
        })
    }

    fn count_rows(&mut self, sql: &str) -> Result<u64> {
        debug!(sql, "query (counting)");
        let conn = self.conn.as_mut().ok_or(IoError::Closed)?;
        self.runtime.block_on(async {
            let mut result = conn.query_iter(sql).await.map_err(query_error(sql))?;
            let mut rows = 0u64;
            result
                .for_each(|_| rows += 1)
                .await
                .map_err(query_error(sql))?;
            result.drop_result().await.map_err(query_error(sql))?;
            Ok(rows)
        })
    }

    fn first_u64(&mut self, sql: &str) -> Result<Option<u64>> {
        debug!(sql, "query (first)");
        let conn = self.conn.as_mut().ok_or(IoError::Closed)?;
        self.runtime
            .block_on(conn.query_first::<u64, _>(sql))
            .map_err(query_error(sql))
    }

    fn text_rows(&mut self, sql: &str) -> Result<Vec<Vec<String>>> {
        debug!(sql, "query (rows)");
        let conn = self.conn.as_mut().ok_or(IoError::Closed)?;
        let rows: Vec<Row> = self
            .runtime
            .block_on(conn.query(sql))
            .map_err(query_error(sql))?;
        Ok(rows.iter().map(row_text).collect())
    }

    fn connection_id(&self) -> u32 {
        self.id
    }
}
