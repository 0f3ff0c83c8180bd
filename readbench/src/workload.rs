//! Key selection for the point-read workload.

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// How a worker picks the next row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[value(rename_all = "kebab_case")]
pub enum KeySelection {
    /// Cycle through `1..=rows` in order, wrapping around.
    #[default]
    Sequential,
    /// Draw ids uniformly from `1..=rows`.
    UniformRandom,
}

impl KeySelection {
    pub fn label(self) -> &'static str {
        match self {
            KeySelection::Sequential => "sequential",
            KeySelection::UniformRandom => "uniform-random",
        }
    }
}

/// Per-worker key generator. Never shared between workers.
#[derive(Debug)]
pub enum KeySelector {
    Sequential { issued: u64, rows: u32 },
    UniformRandom { rng: StdRng, rows: u32 },
}

impl KeySelector {
    /// `rows` must be non-zero.
    pub fn new(selection: KeySelection, rows: u32, rng: StdRng) -> Self {
        debug_assert!(rows > 0, "key space must not be empty");
        match selection {
            KeySelection::Sequential => KeySelector::Sequential { issued: 0, rows },
            KeySelection::UniformRandom => KeySelector::UniformRandom { rng, rows },
        }
    }

    /// Build the selector for worker number `worker` of a run.
    ///
    /// With a seed, each worker gets its own deterministic stream.
    pub fn for_worker(selection: KeySelection, rows: u32, seed: Option<u64>, worker: usize) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ (worker as u64).wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        Self::new(selection, rows, rng)
    }

    pub fn next_id(&mut self) -> u32 {
        match self {
            KeySelector::Sequential { issued, rows } => {
                let id = (*issued % u64::from(*rows)) as u32 + 1;
                *issued += 1;
                id
            }
            KeySelector::UniformRandom { rng, rows } => rng.gen_range(1..=*rows),
        }
    }
}
