//! Database access seam shared by the seeder and the benchmark workers.
//!
//! A [`Connector`] opens one [`Session`] per endpoint. Each session is a
//! single dedicated connection; nothing here pools or shares connections.
//! [`mysql::MySqlConnector`] is the production implementation.

pub mod mysql;

use crate::config::Endpoint;
use anyhow::Result;
use readbench_core::dataset::UserRow;
use std::future::Future;

/// Opens sessions against individual endpoints.
pub trait Connector: Send + Sync {
    type Session: Session + 'static;

    /// Open a dedicated connection to `endpoint`.
    fn connect(&self, endpoint: &Endpoint) -> impl Future<Output = Result<Self::Session>> + Send;
}

/// One exclusive connection to a database server.
///
/// Each method issues exactly one statement (or none, for `close`).
pub trait Session: Send {
    /// `CREATE TABLE IF NOT EXISTS users (...)`.
    fn ensure_schema(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// `SELECT COUNT(*) FROM users`.
    fn count_rows(&mut self) -> impl Future<Output = Result<u64>> + Send;

    /// `TRUNCATE TABLE users`.
    fn truncate(&mut self) -> impl Future<Output = Result<()>> + Send;

    fn insert_row(&mut self, row: &UserRow) -> impl Future<Output = Result<()>> + Send;

    /// Set the session-level read staleness, in seconds.
    fn set_read_staleness(&mut self, seconds: i64) -> impl Future<Output = Result<()>> + Send;

    /// Read a single row by primary key. A missing row is not an error.
    fn point_read(&mut self, id: u32) -> impl Future<Output = Result<Option<UserRow>>> + Send;

    fn close(self) -> impl Future<Output = Result<()>> + Send;
}
