//! Dataset setup: make sure the `users` table holds exactly the configured
//! number of rows before any worker starts reading.
//!
//! Every failure in here is fatal for the run and is returned with context.

use crate::backend::{Connector, Session};
use crate::config::BenchConfig;
use anyhow::{Context, Result};
use rand::Rng;
use readbench_core::dataset::generate_rows;

const PROGRESS_EVERY: u32 = 1_000;

/// What setup did to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The row count already matched; nothing was written.
    Skipped { rows: u64 },
    /// The table was truncated and refilled.
    Reseeded { previous: u64, inserted: u32 },
}

/// Ensure the schema exists and the table holds exactly `rows` rows.
pub async fn seed<S, R>(session: &mut S, rows: u32, rng: &mut R) -> Result<SeedOutcome>
where
    S: Session,
    R: Rng,
{
    session
        .ensure_schema()
        .await
        .context("failed to create table")?;

    let existing = session
        .count_rows()
        .await
        .context("failed to query existing row count")?;
    if existing == u64::from(rows) {
        log::info!("{rows} rows exist, skipping data load");
        return Ok(SeedOutcome::Skipped { rows: existing });
    }

    session
        .truncate()
        .await
        .context("failed to truncate table")?;

    log::info!("Inserting sample data ({existing} rows found, {rows} wanted)...");
    for row in generate_rows(rows, rng) {
        session
            .insert_row(&row)
            .await
            .with_context(|| format!("failed to insert row {}", row.id))?;
        if row.id % PROGRESS_EVERY == 0 {
            log::debug!("inserted {}/{rows} rows", row.id);
        }
    }
    log::info!("Data insertion complete.");

    Ok(SeedOutcome::Reseeded {
        previous: existing,
        inserted: rows,
    })
}

/// Connect to the setup endpoint, seed the table, and close the connection.
pub async fn prepare_dataset<C, R>(connector: &C, config: &BenchConfig, rng: &mut R) -> Result<SeedOutcome>
where
    C: Connector,
    R: Rng,
{
    let endpoint = config.setup_endpoint()?;
    log::info!("Preparing dataset via {endpoint}");

    let mut session = connector
        .connect(endpoint)
        .await
        .context("failed to open setup connection")?;
    let outcome = seed(&mut session, config.rows, rng).await?;
    session
        .close()
        .await
        .context("failed to close setup connection")?;

    Ok(outcome)
}
