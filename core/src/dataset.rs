//! The benchmark dataset: one flat `users` table with sequential ids.
//!
//! Rows are generated on the fly while seeding so the full table never has
//! to live in memory. Ids run `1..=count`, names are derived from the id and
//! ages are drawn from the supplied RNG.

use crate::constants::AGE_LIMIT;
use rand::Rng;

/// One row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: u32,
    pub name: String,
    pub age: u8,
}

impl UserRow {
    /// Name stored for a given id. Names are zero-based (`user_0` belongs to id 1).
    pub fn name_for(id: u32) -> String {
        format!("user_{}", id.saturating_sub(1))
    }
}

/// Generate `count` rows with ids `1..=count` and random ages.
///
/// Pass a seeded `StdRng` for reproducible data, `thread_rng()` otherwise.
pub fn generate_rows<R: Rng>(count: u32, rng: &mut R) -> impl Iterator<Item = UserRow> + '_ {
    (1..=count).map(move |id| UserRow {
        id,
        name: UserRow::name_for(id),
        age: rng.gen_range(0..AGE_LIMIT),
    })
}
