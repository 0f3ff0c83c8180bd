//! Benchmark driver: one read worker per endpoint against a shared deadline.
//!
//! Each worker owns its connection. The only state shared between workers is
//! the [`OpCounter`]; workers also keep a local count so the aggregate can be
//! checked against the per-endpoint numbers after join.
//!
//! The deadline is only checked between queries, so a slow query can run past
//! it. Queries are not given their own timeout.

use crate::backend::{Connector, Session};
use crate::config::{BenchConfig, Endpoint};
use crate::workload::KeySelector;
use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Process-wide count of successful reads.
#[derive(Debug, Default)]
pub struct OpCounter(AtomicU64);

impl OpCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// What one worker did during the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub endpoint: Endpoint,
    /// False when the connection could not be opened; the worker did nothing.
    pub connected: bool,
    pub completed: u64,
    pub failed: u64,
}

impl WorkerReport {
    fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            connected: false,
            completed: 0,
            failed: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BenchmarkOutcome {
    /// One entry per configured endpoint, in configuration order.
    pub workers: Vec<WorkerReport>,
    /// Counter value after every worker returned.
    pub total_ops: u64,
    /// Wall time from start until the last worker returned.
    pub elapsed: Duration,
}

/// Run the read workload on every endpoint until `config.duration` elapses.
///
/// Returns only once every worker has finished. An invalid configuration is
/// rejected before any worker starts.
pub async fn run_benchmark<C>(
    connector: Arc<C>,
    config: &BenchConfig,
    counter: Arc<OpCounter>,
) -> Result<BenchmarkOutcome>
where
    C: Connector + 'static,
{
    config.validate()?;

    let start = Instant::now();
    let deadline = start + config.duration;
    log::info!(
        "Starting read-only benchmark for {:?} on {} endpoint(s), {} keys",
        config.duration,
        config.endpoints.len(),
        config.key_selection.label()
    );

    let handles: Vec<_> = config
        .endpoints
        .iter()
        .enumerate()
        .map(|(worker, endpoint)| {
            let selector =
                KeySelector::for_worker(config.key_selection, config.rows, config.rng_seed, worker);
            tokio::spawn(run_worker(
                connector.clone(),
                endpoint.clone(),
                config.staleness,
                selector,
                deadline,
                counter.clone(),
            ))
        })
        .collect();

    let mut workers = Vec::with_capacity(handles.len());
    let mut panicked = 0;
    for (handle, endpoint) in handles.into_iter().zip(&config.endpoints) {
        match handle.await {
            Ok(report) => workers.push(report),
            Err(e) => {
                log::error!("worker for {endpoint} did not finish: {e}");
                panicked += 1;
            }
        }
    }
    if panicked > 0 {
        return Err(anyhow!("{panicked} benchmark worker(s) panicked"));
    }

    Ok(BenchmarkOutcome {
        workers,
        total_ops: counter.get(),
        elapsed: start.elapsed(),
    })
}

async fn run_worker<C: Connector>(
    connector: Arc<C>,
    endpoint: Endpoint,
    staleness: i64,
    mut selector: KeySelector,
    deadline: Instant,
    counter: Arc<OpCounter>,
) -> WorkerReport {
    let mut report = WorkerReport::new(endpoint);

    let mut session = match connector.connect(&report.endpoint).await {
        Ok(session) => session,
        Err(e) => {
            log::error!("failed to open connection to {}: {e:#}", report.endpoint);
            return report;
        }
    };
    report.connected = true;

    if staleness != 0 {
        if let Err(e) = session.set_read_staleness(staleness).await {
            log::warn!("failed to set read staleness on {}: {e:#}", report.endpoint);
        }
    }

    while Instant::now() < deadline {
        let id = selector.next_id();
        match session.point_read(id).await {
            Ok(_) => {
                report.completed += 1;
                counter.increment();
            }
            Err(e) => {
                report.failed += 1;
                log::warn!("query error on {}: {e:#}", report.endpoint);
            }
        }
    }

    if let Err(e) = session.close().await {
        log::debug!("{e:#}");
    }
    log::info!(
        "worker {} finished: {} ok, {} failed",
        report.endpoint,
        report.completed,
        report.failed
    );
    report
}
