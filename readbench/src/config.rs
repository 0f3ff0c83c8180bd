//! Command-line and environment configuration.
//!
//! Every flag also reads a `READBENCH_*` environment variable, so a `.env`
//! file loaded by `main` can carry the cluster layout. Flags win over the
//! environment; built-in defaults describe the reference three-node cluster.

use crate::workload::KeySelection;
use clap::{CommandFactory, Parser};
use log::LevelFilter;
use readbench_core::constants::{
    DEFAULT_DATABASE, DEFAULT_DURATION_SECS, DEFAULT_ENDPOINTS, DEFAULT_PORT, DEFAULT_ROW_COUNT,
    DEFAULT_USER,
};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("at least one endpoint is required")]
    NoEndpoints,
    #[error("invalid endpoint `{0}`: expected host or host:port")]
    InvalidEndpoint(String),
    #[error("invalid port in endpoint `{0}`")]
    InvalidPort(String),
    #[error("benchmark duration must be greater than zero")]
    ZeroDuration,
    #[error("dataset must contain at least one row")]
    EmptyDataset,
}

/// Network address of one database server under test.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (host, port) = match s.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .ok()
                    .filter(|p| *p != 0)
                    .ok_or_else(|| ConfigError::InvalidPort(s.to_string()))?;
                (host, port)
            }
            None => (s, DEFAULT_PORT),
        };
        if host.is_empty() || host.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidEndpoint(s.to_string()));
        }
        Ok(Endpoint::new(host, port))
    }
}

/// Credentials and database shared by every connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub user: String,
    pub password: Option<String>,
    pub database: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER.to_string(),
            password: None,
            database: DEFAULT_DATABASE.to_string(),
        }
    }
}

/// Everything the seeder and the driver need to know about a run.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// One worker is started per endpoint. Setup runs against the first one.
    pub endpoints: Vec<Endpoint>,
    pub connection: ConnectionSettings,
    pub duration: Duration,
    pub rows: u32,
    /// `tidb_read_staleness` in seconds; 0 leaves the session untouched.
    pub staleness: i64,
    pub key_selection: KeySelection,
    /// Seed for age generation and random key selection. `None` uses entropy.
    pub rng_seed: Option<u64>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            connection: ConnectionSettings::default(),
            duration: Duration::from_secs(DEFAULT_DURATION_SECS),
            rows: DEFAULT_ROW_COUNT,
            staleness: 0,
            key_selection: KeySelection::default(),
            rng_seed: None,
        }
    }
}

impl BenchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoints.is_empty() {
            return Err(ConfigError::NoEndpoints);
        }
        if self.duration.is_zero() {
            return Err(ConfigError::ZeroDuration);
        }
        if self.rows == 0 {
            return Err(ConfigError::EmptyDataset);
        }
        Ok(())
    }

    /// Endpoint used for schema setup and seeding.
    pub fn setup_endpoint(&self) -> Result<&Endpoint, ConfigError> {
        self.endpoints.first().ok_or(ConfigError::NoEndpoints)
    }
}

fn default_endpoints() -> Vec<Endpoint> {
    DEFAULT_ENDPOINTS
        .iter()
        .filter_map(|e| e.parse().ok())
        .collect()
}

#[derive(Parser, Debug)]
#[command(version, about = "Read-only point-select throughput benchmark for TiDB")]
pub struct Args {
    /// tidb_read_staleness in seconds, negative for stale reads, 0 to disable
    #[arg(long, env = "READBENCH_STALENESS", default_value_t = 0, allow_negative_numbers = true)]
    pub staleness: i64,

    /// Comma separated host[:port] list; one worker per endpoint
    #[arg(long, env = "READBENCH_ENDPOINTS", value_delimiter = ',')]
    pub endpoints: Vec<Endpoint>,

    #[arg(long, env = "READBENCH_USER", default_value = DEFAULT_USER)]
    pub user: String,

    #[arg(long, env = "READBENCH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long, env = "READBENCH_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Benchmark duration in seconds
    #[arg(long, env = "READBENCH_DURATION_SECS", default_value_t = DEFAULT_DURATION_SECS)]
    pub duration_secs: u64,

    /// Number of rows seeded into the users table
    #[arg(long, env = "READBENCH_ROWS", default_value_t = DEFAULT_ROW_COUNT)]
    pub rows: u32,

    #[arg(long, env = "READBENCH_KEY_SELECTION", value_enum, default_value_t = KeySelection::Sequential)]
    pub key_selection: KeySelection,

    /// Seed for reproducible ages and random keys
    #[arg(long, env = "READBENCH_RNG_SEED")]
    pub rng_seed: Option<u64>,

    #[arg(long, env = "READBENCH_LOG_LEVEL", default_value = "info")]
    pub log_level: LevelFilter,

    /// Also append log output to this file
    #[arg(long, env = "READBENCH_LOG_FILE")]
    pub log_file: Option<String>,
}

/// Rewrite Go-style single-dash long flags (`-staleness 5`, `-staleness=5`)
/// into the `--` form clap expects. Anything after a bare `--` is left alone.
pub fn normalize_long_flags<I, S>(argv: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let command = Args::command();
    let is_long = |name: &str| {
        command
            .get_arguments()
            .any(|arg| arg.get_long() == Some(name))
    };

    let mut rest_is_positional = false;
    argv.into_iter()
        .map(Into::into)
        .map(|arg| {
            if rest_is_positional || arg.starts_with("--") || !arg.starts_with('-') {
                rest_is_positional |= arg == "--";
                return arg;
            }
            let name = arg[1..].split('=').next().unwrap_or_default();
            if is_long(name) {
                format!("-{arg}")
            } else {
                arg
            }
        })
        .collect()
}

impl TryFrom<Args> for BenchConfig {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let endpoints = if args.endpoints.is_empty() {
            default_endpoints()
        } else {
            args.endpoints
        };
        let config = BenchConfig {
            endpoints,
            connection: ConnectionSettings {
                user: args.user,
                password: args.password,
                database: args.database,
            },
            duration: Duration::from_secs(args.duration_secs),
            rows: args.rows,
            staleness: args.staleness,
            key_selection: args.key_selection,
            rng_seed: args.rng_seed,
        };
        config.validate()?;
        Ok(config)
    }
}
