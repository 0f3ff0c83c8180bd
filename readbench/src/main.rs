//! Standalone benchmark runner.
//!
//! Loads `.env` from the working directory, parses flags (each flag also has a
//! `READBENCH_*` environment variable), seeds the dataset through the first
//! endpoint and then reads from every endpoint for the configured duration.
//!
//! Usage:
//!   cargo run --release
//!   cargo run --release -- --staleness -5 --endpoints db1:4000,db2:4000
//!   cargo run --release -- -staleness -5      # single-dash long flags work too

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use readbench::backend::mysql::MySqlConnector;
use readbench::config::{normalize_long_flags, Args, BenchConfig};
use readbench::driver::{run_benchmark, OpCounter};
use readbench::report::{print_report, Summary};
use readbench::seeder::prepare_dataset;
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();
    let args = Args::parse_from(normalize_long_flags(std::env::args()));

    readbench_core::initialize_logger(args.log_level, args.log_file.as_deref()).unwrap_or_else(
        |e| {
            eprintln!("Failed to initialize logger: {e:#}. Exiting.");
            process::exit(1);
        },
    );
    if let Ok(path) = dotenv {
        log::debug!("loaded environment from {}", path.display());
    }

    if let Err(e) = run(args).await {
        log::error!("{e:#}");
        process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = BenchConfig::try_from(args)?;
    log::info!(
        "endpoints: {}",
        config
            .endpoints
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    if config.staleness != 0 {
        log::info!("read staleness: {}s", config.staleness);
    }

    let connector = Arc::new(MySqlConnector::new(config.connection.clone()));

    let mut rng = match config.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    prepare_dataset(connector.as_ref(), &config, &mut rng).await?;

    let counter = Arc::new(OpCounter::new());
    let outcome = run_benchmark(connector, &config, counter).await?;

    print_report(&Summary::new(outcome, config.duration));
    Ok(())
}
