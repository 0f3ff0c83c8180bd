//! Read-only throughput benchmark for a TiDB cluster.
//!
//! A run has three phases:
//! - **Setup**: connect to the first endpoint and make sure the `users` table
//!   holds exactly the configured number of rows ([`seeder`]).
//! - **Benchmark**: one worker per endpoint issues point reads until a shared
//!   deadline passes ([`driver`]).
//! - **Report**: total successful reads and reads per second ([`report`]).
//!
//! Run: `cargo run --release -- --staleness -5`
//! Run tests: `cargo test`

pub mod backend;
pub mod config;
pub mod driver;
pub mod report;
pub mod seeder;
pub mod workload;
