//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the ledger engine requires from its environment.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::errors::KVStoreError;
use crate::domain::Timestamp;

/// Finite stream of stored `(key, value)` entries.
pub type EntryStream<'a> = BoxStream<'a, Result<(Vec<u8>, Vec<u8>), KVStoreError>>;

/// Abstract interface for key-value storage.
///
/// Every call is a suspension point. Implementations must be safe to share
/// between tasks behind an `Arc`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    ///
    /// Returns `KVStoreError::NotFound` when the key is absent.
    async fn get(&self, key: &[u8]) -> Result<Vec<u8>, KVStoreError>;

    /// Persist `value` under `key` and return the value as read back from
    /// the store once it is durable.
    async fn put(&self, key: &[u8], value: &[u8]) -> Result<Vec<u8>, KVStoreError>;

    /// Number of distinct keys.
    async fn count(&self) -> Result<u64, KVStoreError>;

    /// Stream every entry with the key it is stored under.
    ///
    /// Adapters yield entries in key order, but consumers must not depend on
    /// it.
    fn stream(&self) -> EntryStream<'_>;
}

/// Abstract interface for time.
pub trait TimeSource: Send + Sync {
    /// Current Unix time in whole seconds.
    fn now(&self) -> Timestamp;
}
