//! Constants shared by the seeder and the benchmark driver.

/// Number of rows the benchmark table is expected to hold.
pub const DEFAULT_ROW_COUNT: u32 = 10_000;

/// Ages are seeded uniformly from `0..AGE_LIMIT`.
pub const AGE_LIMIT: u8 = 100;

/// Width of the `name` column.
pub const NAME_MAX_LEN: usize = 64;

pub const TABLE_NAME: &str = "users";
pub const DEFAULT_DATABASE: &str = "test";
pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_CHARSET: &str = "utf8mb4";

/// TiDB listens on 4000 unless told otherwise.
pub const DEFAULT_PORT: u16 = 4000;

/// Servers under test when nothing else is configured.
pub const DEFAULT_ENDPOINTS: [&str; 3] = ["10.148.0.15:4000", "10.148.0.16:4000", "10.148.0.17:4000"];

/// Default benchmark duration in seconds.
pub const DEFAULT_DURATION_SECS: u64 = 600;

/// Session variable controlling historical reads.
pub const READ_STALENESS_VARIABLE: &str = "tidb_read_staleness";
