//! Report module: turns the final counter into the throughput summary.

use crate::driver::{BenchmarkOutcome, WorkerReport};
use std::time::Duration;

/// Final numbers for one run.
#[derive(Debug, Clone)]
pub struct Summary {
    pub total_ops: u64,
    /// Configured benchmark duration; throughput is computed against this.
    pub duration: Duration,
    /// Measured wall time, including the tail of the last query.
    pub elapsed: Duration,
    pub workers: Vec<WorkerReport>,
}

impl Summary {
    pub fn new(outcome: BenchmarkOutcome, duration: Duration) -> Self {
        Self {
            total_ops: outcome.total_ops,
            duration,
            elapsed: outcome.elapsed,
            workers: outcome.workers,
        }
    }

    /// Operations per second over the configured duration.
    pub fn tps(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.total_ops as f64 / secs
    }

    pub fn failed_queries(&self) -> u64 {
        self.workers.iter().map(|w| w.failed).sum()
    }

    pub fn unreachable_endpoints(&self) -> usize {
        self.workers.iter().filter(|w| !w.connected).count()
    }

    pub fn summary_line(&self) -> String {
        format!("Total operations: {}, TPS={:.2}", self.total_ops, self.tps())
    }
}

/// Log the per-endpoint breakdown and print the summary line last.
pub fn print_report(summary: &Summary) {
    for worker in &summary.workers {
        if worker.connected {
            log::info!(
                "  {:<24} {:>12} ok {:>8} failed",
                worker.endpoint.to_string(),
                worker.completed,
                worker.failed
            );
        } else {
            log::info!("  {:<24} unreachable", worker.endpoint.to_string());
        }
    }
    if summary.failed_queries() > 0 {
        log::warn!(
            "{} queries failed and are not included in the total",
            summary.failed_queries()
        );
    }
    if summary.unreachable_endpoints() > 0 {
        log::warn!(
            "{} endpoint(s) could not be reached",
            summary.unreachable_endpoints()
        );
    }
    log::info!(
        "Benchmark took {:.2?} (configured {:?})",
        summary.elapsed,
        summary.duration
    );

    let line = summary.summary_line();
    log::info!("{line}");
    println!("{line}");
}
