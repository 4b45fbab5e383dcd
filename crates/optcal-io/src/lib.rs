#![forbid(unsafe_code)]
//! optcal-io: everything that talks SQL.
//!
//! - `client`: the minimal `SqlClient` contract and its MySQL-protocol
//!   implementation (blocking, one connection, driven by a private runtime)
//! - `statements`: SQL text builders
//! - `table`: `SqlTable`, a `PredicateTable` over a `SqlClient`
//! - `session`: `Session`, the executor's view of a connection

pub mod client;
pub mod error;
pub mod session;
pub mod statements;
pub mod table;

pub use client::{MySqlClient, SqlClient};
pub use error::{IoError, Result};
pub use session::{Session, SqlSession};
pub use table::SqlTable;
