//! Process configuration read from the environment.
//!
//! Required:
//! - `PLAYGROUND_INTERPRETER`: interpreter executable run on each artifact
//! - `PLAYGROUND_SCRATCH_DIR`: directory artifacts are written to
//! - `PLAYGROUND_SCRATCH_BASENAME`: artifact file name prefix
//! - `DB`: storage address (Dgraph alpha HTTP address, or SQLite file path)
//!
//! Optional:
//! - `PLAYGROUND_STORAGE`: `dgraph` (default), `sqlite` or `memory`
//! - `PLAYGROUND_BIND`: listen address (default: "0.0.0.0")
//! - `PLAYGROUND_PORT`: listen port (default: "3000")
//! - `PLAYGROUND_FILE_EXT`: artifact extension (default: "py")
//! - `PLAYGROUND_EXEC_TIMEOUT_SECS`: per-run limit, `0` disables (default: 10)
//! - `PLAYGROUND_PAGE_SIZE`: records per page (default: 2)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use playground_exec::RunnerConfig;
use playground_storage::query::DEFAULT_PAGE_SIZE;

/// Which storage backend the service talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Dgraph,
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dgraph" => Ok(StorageBackend::Dgraph),
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!(
                "unknown storage backend '{}': use dgraph, sqlite or memory",
                other
            )),
        }
    }
}

/// Configuration errors. Any of these aborts startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Fully resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub runner: RunnerConfig,
    pub storage: StorageBackend,
    /// Storage address; `None` only for the memory backend.
    pub db_address: Option<String>,
    pub page_size: usize,
}

impl Config {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let interpreter = require("PLAYGROUND_INTERPRETER")?;
        let scratch_dir = require("PLAYGROUND_SCRATCH_DIR")?;
        let base_name = require("PLAYGROUND_SCRATCH_BASENAME")?;

        let storage = match get("PLAYGROUND_STORAGE") {
            Some(raw) => raw
                .parse::<StorageBackend>()
                .map_err(|reason| ConfigError::Invalid {
                    var: "PLAYGROUND_STORAGE",
                    reason,
                })?,
            None => StorageBackend::Dgraph,
        };
        let db_address = match storage {
            StorageBackend::Memory => get("DB"),
            StorageBackend::Dgraph | StorageBackend::Sqlite => Some(require("DB")?),
        };

        let host = match get("PLAYGROUND_BIND") {
            // Tolerate the bracketed form, `[::1]`.
            Some(raw) => parse_var::<IpAddr>(
                "PLAYGROUND_BIND",
                raw.trim_start_matches('[').trim_end_matches(']'),
            )?,
            None => IpAddr::from([0, 0, 0, 0]),
        };
        let port = match get("PLAYGROUND_PORT") {
            Some(raw) => parse_var::<u16>("PLAYGROUND_PORT", &raw)?,
            None => 3000,
        };
        let bind_addr = SocketAddr::new(host, port);

        let timeout = match get("PLAYGROUND_EXEC_TIMEOUT_SECS") {
            Some(raw) => match parse_var::<u64>("PLAYGROUND_EXEC_TIMEOUT_SECS", &raw)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => Some(playground_exec::config::DEFAULT_TIMEOUT),
        };

        let page_size = match get("PLAYGROUND_PAGE_SIZE") {
            Some(raw) => parse_var::<usize>("PLAYGROUND_PAGE_SIZE", &raw)?,
            None => DEFAULT_PAGE_SIZE,
        };
        if page_size == 0 {
            return Err(ConfigError::Invalid {
                var: "PLAYGROUND_PAGE_SIZE",
                reason: "must be at least 1".to_string(),
            });
        }

        let mut runner =
            RunnerConfig::new(interpreter, scratch_dir, base_name).with_timeout(timeout);
        if let Some(ext) = get("PLAYGROUND_FILE_EXT") {
            runner = runner.with_extension(ext);
        }

        Ok(Config {
            bind_addr,
            runner,
            storage,
            db_address,
            page_size,
        })
    }
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: format!("'{}': {}", raw, e),
    })
}
