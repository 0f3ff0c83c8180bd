//! MySQL-protocol backend built on `sqlx`, used against TiDB.

use super::{Connector, Session};
use crate::config::{ConnectionSettings, Endpoint};
use anyhow::{Context, Result};
use readbench_core::constants::{DEFAULT_CHARSET, READ_STALENESS_VARIABLE};
use readbench_core::dataset::UserRow;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Connection, Executor, Row};

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS users (
    id INT PRIMARY KEY,
    name VARCHAR(64),
    age INT
)";
const COUNT_SQL: &str = "SELECT COUNT(*) FROM users";
const TRUNCATE_SQL: &str = "TRUNCATE TABLE users";
const INSERT_SQL: &str = "INSERT INTO users (id, name, age) VALUES (?, ?, ?)";
const POINT_READ_SQL: &str = "SELECT id, name, age FROM users WHERE id = ?";

/// Opens one `MySqlConnection` per session; no pooling.
#[derive(Debug, Clone)]
pub struct MySqlConnector {
    settings: ConnectionSettings,
}

impl MySqlConnector {
    pub fn new(settings: ConnectionSettings) -> Self {
        Self { settings }
    }

    fn options_for(&self, endpoint: &Endpoint) -> MySqlConnectOptions {
        let options = MySqlConnectOptions::new()
            .host(endpoint.host())
            .port(endpoint.port())
            .username(&self.settings.user)
            .database(&self.settings.database)
            .charset(DEFAULT_CHARSET);
        match &self.settings.password {
            Some(password) => options.password(password),
            None => options,
        }
    }
}

impl Connector for MySqlConnector {
    type Session = MySqlSession;

    async fn connect(&self, endpoint: &Endpoint) -> Result<MySqlSession> {
        let conn = MySqlConnection::connect_with(&self.options_for(endpoint))
            .await
            .with_context(|| format!("failed to connect to {endpoint}"))?;
        log::debug!("connected to {endpoint}");
        Ok(MySqlSession {
            endpoint: endpoint.clone(),
            conn,
        })
    }
}

pub struct MySqlSession {
    endpoint: Endpoint,
    conn: MySqlConnection,
}

impl MySqlSession {
    /// Run a statement over the text protocol. DDL and `SET` go through here
    /// since they gain nothing from being prepared.
    async fn execute_text(&mut self, sql: &str) -> Result<()> {
        self.conn
            .execute(sql)
            .await
            .with_context(|| format!("`{sql}` failed on {}", self.endpoint))?;
        Ok(())
    }
}

fn decode_user(row: &MySqlRow) -> Result<UserRow> {
    let id: i32 = row.try_get("id")?;
    let name: Option<String> = row.try_get("name")?;
    let age: Option<i32> = row.try_get("age")?;
    Ok(UserRow {
        id: u32::try_from(id).context("negative id in users table")?,
        name: name.unwrap_or_default(),
        age: u8::try_from(age.unwrap_or_default()).context("age out of range")?,
    })
}

impl Session for MySqlSession {
    async fn ensure_schema(&mut self) -> Result<()> {
        self.execute_text(CREATE_TABLE_SQL).await
    }

    async fn count_rows(&mut self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(COUNT_SQL)
            .fetch_one(&mut self.conn)
            .await
            .with_context(|| format!("failed to count rows on {}", self.endpoint))?;
        u64::try_from(count).context("row count is negative")
    }

    async fn truncate(&mut self) -> Result<()> {
        self.execute_text(TRUNCATE_SQL).await
    }

    async fn insert_row(&mut self, row: &UserRow) -> Result<()> {
        sqlx::query(INSERT_SQL)
            .bind(row.id)
            .bind(row.name.as_str())
            .bind(row.age)
            .execute(&mut self.conn)
            .await
            .with_context(|| format!("failed to insert row {} on {}", row.id, self.endpoint))?;
        Ok(())
    }

    async fn set_read_staleness(&mut self, seconds: i64) -> Result<()> {
        let sql = format!("SET SESSION {READ_STALENESS_VARIABLE} = {seconds}");
        self.execute_text(&sql).await
    }

    async fn point_read(&mut self, id: u32) -> Result<Option<UserRow>> {
        let row = sqlx::query(POINT_READ_SQL)
            .bind(id)
            .fetch_optional(&mut self.conn)
            .await?;
        row.as_ref().map(decode_user).transpose()
    }

    async fn close(self) -> Result<()> {
        let endpoint = self.endpoint;
        self.conn
            .close()
            .await
            .with_context(|| format!("failed to close connection to {endpoint}"))
    }
}
