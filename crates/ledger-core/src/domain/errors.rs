//! # Domain Errors
//!
//! Error types for the ledger and its store port.
//!
//! ## Design Principles
//!
//! - The set of ledger failures is closed; callers match on it exhaustively
//! - Tampering is reported as data (`IntegrityViolation`), never as an `Err`
//! - Store failures are carried unchanged to the caller

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors returned by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// No block is stored at this height.
    #[error("No block at height {height}")]
    NotFound {
        /// Requested height
        height: u64,
    },

    /// The store adapter failed (I/O, corruption, serialization, lock).
    #[error("Store failure: {0}")]
    StoreFailure(#[from] KVStoreError),

    /// Internal consistency fault detected before anything was written.
    #[error("Invariant violation at height {height}: {reason}")]
    InvariantViolation {
        /// Height the append was about to write
        height: u64,
        /// What was found inconsistent
        reason: String,
    },
}

impl LedgerError {
    /// Whether this error means "no such block".
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::NotFound { .. })
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::StoreFailure(err.into())
    }
}

/// Key-value store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// Key not found.
    #[error("Key not found in KV store")]
    NotFound,

    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError {
        /// Underlying error description
        message: String,
    },

    /// Persisted data could not be interpreted.
    #[error("KV store corruption: {message}")]
    CorruptionError {
        /// What was malformed
        message: String,
    },

    /// Value could not be encoded or decoded.
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Codec error description
        message: String,
    },

    /// Another process holds the data file.
    #[error("KV store locked: {message}")]
    Locked {
        /// Lock holder details
        message: String,
    },
}

impl From<std::io::Error> for KVStoreError {
    fn from(err: std::io::Error) -> Self {
        KVStoreError::IOError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for KVStoreError {
    fn from(err: serde_json::Error) -> Self {
        KVStoreError::SerializationError {
            message: err.to_string(),
        }
    }
}

/// The check a block failed during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityCheck {
    /// Stored `hash` does not match the recomputed content hash.
    ContentHash,
    /// `previousBlockHash` does not match the predecessor's `hash`.
    Linkage,
    /// The predecessor block is absent, so linkage cannot hold.
    MissingPredecessor,
    /// The block's own `height` differs from the key it is stored under.
    HeightMismatch,
    /// The stored value does not decode to a block.
    Undecodable,
}

impl fmt::Display for IntegrityCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityCheck::ContentHash => write!(f, "content hash mismatch"),
            IntegrityCheck::Linkage => write!(f, "previous block hash mismatch"),
            IntegrityCheck::MissingPredecessor => write!(f, "previous block missing"),
            IntegrityCheck::HeightMismatch => write!(f, "height does not match storage key"),
            IntegrityCheck::Undecodable => write!(f, "stored value is not a block"),
        }
    }
}

/// One inconsistency found by chain validation.
///
/// Ordered by height, then by check.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Error,
)]
#[error("Invalid block #{height}: {check}")]
pub struct IntegrityViolation {
    /// Height of the offending block.
    pub height: u64,
    /// Failed check.
    pub check: IntegrityCheck,
}

impl IntegrityViolation {
    /// Create a descriptor.
    pub fn new(height: u64, check: IntegrityCheck) -> Self {
        Self { height, check }
    }
}
