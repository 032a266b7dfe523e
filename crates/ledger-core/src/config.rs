//! # Ledger Configuration
//!
//! Tunables for the ledger engine.

use serde::{Deserialize, Serialize};

/// Default number of per-block checks run at once by chain validation.
pub const DEFAULT_VALIDATION_CONCURRENCY: usize = 16;

/// Ledger engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Maximum number of block checks in flight during chain validation.
    pub validation_concurrency: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            validation_concurrency: DEFAULT_VALIDATION_CONCURRENCY,
        }
    }
}

impl LedgerConfig {
    /// Create a config for testing (small fan-out so ordering bugs surface).
    pub fn for_testing() -> Self {
        Self {
            validation_concurrency: 4,
        }
    }

    /// Check the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.validation_concurrency == 0 {
            return Err("validation_concurrency must be at least 1".to_string());
        }
        Ok(())
    }
}
