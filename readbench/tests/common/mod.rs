//! In-memory backend that records every statement it is asked to run.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use readbench::backend::{Connector, Session};
use readbench::config::Endpoint;
use readbench_core::dataset::UserRow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// Writes and session commands, in issue order. Reads are only counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Connect,
    CreateTable,
    Count,
    Truncate,
    Insert(u32),
    SetStaleness(i64),
    Close,
}

/// Session operations that can be switched to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    CreateTable,
    Count,
    Truncate,
    SetStaleness,
    Close,
}

#[derive(Debug, Default)]
pub struct MemoryState {
    pub table_exists: bool,
    pub rows: BTreeMap<u32, UserRow>,
    pub statements: Vec<(String, Statement)>,
    pub reads: HashMap<String, u64>,
    pub unreachable: HashSet<String>,
    pub failing_reads: HashSet<String>,
    pub failing: HashSet<FailPoint>,
    pub inserted: usize,
    /// Inserts beyond this many fail.
    pub insert_limit: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A connector whose table already holds `count` rows.
    pub fn with_rows(count: u32) -> Self {
        let connector = Self::new();
        {
            let mut state = connector.state();
            state.table_exists = true;
            for id in 1..=count {
                state.rows.insert(
                    id,
                    UserRow {
                        id,
                        name: UserRow::name_for(id),
                        age: (id % 100) as u8,
                    },
                );
            }
        }
        connector
    }

    pub fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory state poisoned")
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.state().statements.iter().map(|(_, s)| s.clone()).collect()
    }

    pub fn statements_on(&self, endpoint: &Endpoint) -> Vec<Statement> {
        let key = endpoint.to_string();
        self.state()
            .statements
            .iter()
            .filter(|(e, _)| *e == key)
            .map(|(_, s)| s.clone())
            .collect()
    }

    pub fn count_matching(&self, f: impl Fn(&Statement) -> bool) -> usize {
        self.statements().iter().filter(|s| f(s)).count()
    }

    pub fn reads_on(&self, endpoint: &Endpoint) -> u64 {
        self.state()
            .reads
            .get(&endpoint.to_string())
            .copied()
            .unwrap_or(0)
    }

    pub fn mark_unreachable(&self, endpoint: &Endpoint) {
        self.state().unreachable.insert(endpoint.to_string());
    }

    pub fn fail_reads_on(&self, endpoint: &Endpoint) {
        self.state().failing_reads.insert(endpoint.to_string());
    }

    pub fn fail(&self, point: FailPoint) {
        self.state().failing.insert(point);
    }
}

impl Connector for MemoryConnector {
    type Session = MemorySession;

    async fn connect(&self, endpoint: &Endpoint) -> Result<MemorySession> {
        let key = endpoint.to_string();
        let mut state = self.state();
        if state.unreachable.contains(&key) {
            return Err(anyhow!("connection refused: {key}"));
        }
        state.statements.push((key.clone(), Statement::Connect));
        Ok(MemorySession {
            endpoint: key,
            state: self.state.clone(),
        })
    }
}

pub struct MemorySession {
    endpoint: String,
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySession {
    fn record(&self, statement: Statement) -> MutexGuard<'_, MemoryState> {
        let mut state = self.state.lock().expect("memory state poisoned");
        state.statements.push((self.endpoint.clone(), statement));
        state
    }

    /// Record `statement`, then fail if `point` is switched on.
    fn record_or_fail(
        &self,
        statement: Statement,
        point: FailPoint,
    ) -> Result<MutexGuard<'_, MemoryState>> {
        let state = self.record(statement);
        if state.failing.contains(&point) {
            return Err(anyhow!("{point:?} rejected on {}", self.endpoint));
        }
        Ok(state)
    }
}

impl Session for MemorySession {
    async fn ensure_schema(&mut self) -> Result<()> {
        self.record_or_fail(Statement::CreateTable, FailPoint::CreateTable)?
            .table_exists = true;
        Ok(())
    }

    async fn count_rows(&mut self) -> Result<u64> {
        let state = self.record_or_fail(Statement::Count, FailPoint::Count)?;
        if !state.table_exists {
            return Err(anyhow!("table users does not exist"));
        }
        Ok(state.rows.len() as u64)
    }

    async fn truncate(&mut self) -> Result<()> {
        self.record_or_fail(Statement::Truncate, FailPoint::Truncate)?
            .rows
            .clear();
        Ok(())
    }

    async fn insert_row(&mut self, row: &UserRow) -> Result<()> {
        let mut state = self.record(Statement::Insert(row.id));
        state.inserted += 1;
        let inserted = state.inserted;
        if state.insert_limit.is_some_and(|limit| inserted > limit) {
            return Err(anyhow!("insert rejected"));
        }
        if state.rows.insert(row.id, row.clone()).is_some() {
            return Err(anyhow!("duplicate primary key {}", row.id));
        }
        Ok(())
    }

    async fn set_read_staleness(&mut self, seconds: i64) -> Result<()> {
        self.record_or_fail(Statement::SetStaleness(seconds), FailPoint::SetStaleness)?;
        Ok(())
    }

    async fn point_read(&mut self, id: u32) -> Result<Option<UserRow>> {
        let result = {
            let mut state = self.state.lock().expect("memory state poisoned");
            if state.failing_reads.contains(&self.endpoint) {
                Err(anyhow!("read failed on {}", self.endpoint))
            } else {
                *state.reads.entry(self.endpoint.clone()).or_default() += 1;
                Ok(state.rows.get(&id).cloned())
            }
        };
        tokio::task::yield_now().await;
        result
    }

    async fn close(self) -> Result<()> {
        self.record_or_fail(Statement::Close, FailPoint::Close)?;
        Ok(())
    }
}
