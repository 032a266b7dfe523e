//! # Ledger Core
//!
//! Tamper-evident, append-only ledger: a chain of immutable blocks where every
//! block commits to its own content and to the hash of its predecessor.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Genesis | Height 0 exists, has an empty previous hash and the fixed genesis body |
//! | 2 | Chain Linkage | `previousBlockHash(h) == hash(h - 1)` for every h > 0 |
//! | 3 | Self Hash | Recomputing the digest with `hash` blanked reproduces `hash` |
//! | 4 | Contiguous Heights | Heights form `[0, N-1]` with no gaps or duplicates |
//! | 5 | Append Only | No block is mutated or deleted through `LedgerApi` |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Block entity, content hashing, error taxonomy, store keys
//! - `ports/` - `LedgerApi` (inbound) and `KeyValueStore`/`TimeSource` (outbound)
//! - `adapters/` - In-memory and file-backed stores, system clock
//! - `service/` - `Ledger`, the engine implementing `LedgerApi`
//! - `config.rs` - `LedgerConfig`
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use ledger_core::{InMemoryKVStore, Ledger, LedgerApi, LedgerConfig, LedgerDependencies, SystemTimeSource};
//!
//! let deps = LedgerDependencies {
//!     store: Arc::new(InMemoryKVStore::new()),
//!     time_source: SystemTimeSource,
//! };
//! let ledger = Ledger::open(deps, LedgerConfig::default()).await?;
//! ledger.initialize().await?;
//!
//! let block = ledger.append("hello".to_string()).await?;
//! assert!(ledger.validate_chain().await?.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export key types for convenience
pub use adapters::{FileBackedKVStore, InMemoryKVStore, SystemTimeSource};
pub use config::LedgerConfig;
pub use domain::block::{compute_content_hash, Block, GENESIS_BODY, GENESIS_HEIGHT};
pub use domain::errors::{IntegrityCheck, IntegrityViolation, KVStoreError, LedgerError};
pub use domain::keys::{height_from_key, height_key};
pub use domain::Timestamp;
pub use ports::inbound::LedgerApi;
pub use ports::outbound::{EntryStream, KeyValueStore, TimeSource};
pub use service::{Ledger, LedgerDependencies};
