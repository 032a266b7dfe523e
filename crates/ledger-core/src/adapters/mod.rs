//! # Adapters Module
//!
//! Implementations of the outbound ports.
//!
//! ## Modules
//!
//! - `storage`: `KeyValueStore` implementations (in-memory, file-backed)
//! - `infra`: System clock
//! - `lock`: Single-writer file lock held by the file-backed store

pub mod infra;
pub mod lock;
pub mod storage;

pub use infra::SystemTimeSource;
pub use lock::ChainLock;
pub use storage::{FileBackedKVStore, InMemoryKVStore};
