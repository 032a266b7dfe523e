//! # Node Configuration
//!
//! Defaults plus environment overrides:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `LEDGER_LISTEN_ADDR` | `listen_addr` |
//! | `LEDGER_DATA_PATH` | `data_path` |
//! | `LEDGER_MAX_BODY_BYTES` | `max_body_bytes` |
//! | `LEDGER_VALIDATION_CONCURRENCY` | `ledger.validation_concurrency` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use ledger_core::LedgerConfig;
use thiserror::Error;

/// Default HTTP listen address.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";

/// Default data file.
pub const DEFAULT_DATA_PATH: &str = "./data/ledger.db";

/// Default request body limit (64 KiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable holds a value that cannot be parsed.
    #[error("{var}={value:?} is invalid: {reason}")]
    InvalidValue {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
        /// Parse error
        reason: String,
    },

    /// A parsed value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Full node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Address the HTTP server binds to.
    pub listen_addr: SocketAddr,
    /// Ledger data file.
    pub data_path: PathBuf,
    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
    /// Engine configuration.
    pub ledger: LedgerConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            ledger: LedgerConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Load defaults and apply overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load defaults and apply overrides from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = parse_var(&lookup, "LEDGER_LISTEN_ADDR")? {
            config.listen_addr = addr;
        }
        if let Some(path) = lookup("LEDGER_DATA_PATH") {
            config.data_path = PathBuf::from(path);
        }
        if let Some(limit) = parse_var(&lookup, "LEDGER_MAX_BODY_BYTES")? {
            config.max_body_bytes = limit;
        }
        if let Some(concurrency) = parse_var(&lookup, "LEDGER_VALIDATION_CONCURRENCY")? {
            config.ledger.validation_concurrency = concurrency;
        }

        Ok(config)
    }

    /// Reject values the node cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be at least 1".to_string(),
            ));
        }
        if self.data_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_path is empty".to_string()));
        }
        self.ledger.validate().map_err(ConfigError::Invalid)
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) => Err(ConfigError::InvalidValue {
                var,
                reason: e.to_string(),
                value,
            }),
        },
    }
}
