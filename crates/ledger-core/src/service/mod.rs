//! # Ledger Service
//!
//! The engine implementing `LedgerApi`.
//!
//! ## Architecture
//!
//! - One `Ledger` per chain, sharing one store handle (`Arc<KV>`)
//! - Appends are serialized by an async mutex that owns the next height
//! - Reads take no lock and may observe a block being appended
//! - No caching, no retries, no logging; store failures reach the caller as
//!   `LedgerError::StoreFailure`

mod ledger;
mod validation;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::LedgerConfig;
use crate::domain::block::Block;
use crate::domain::errors::{KVStoreError, LedgerError};
use crate::domain::keys::height_key;
use crate::ports::outbound::{KeyValueStore, TimeSource};

/// The ledger engine.
pub struct Ledger<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    /// Shared store handle.
    pub(crate) store: Arc<KV>,
    /// Clock used to stamp new blocks.
    pub(crate) time_source: TS,
    /// Engine configuration.
    pub(crate) config: LedgerConfig,
    /// Height the next append writes to. Guarding it is the append
    /// critical section.
    pub(crate) next_height: Mutex<u64>,
}

/// Dependencies for `Ledger`.
pub struct LedgerDependencies<KV, TS> {
    /// Store holding the chain.
    pub store: Arc<KV>,
    /// Clock for block timestamps.
    pub time_source: TS,
}

impl<KV, TS> Ledger<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    /// Open the engine over an existing (possibly empty) store.
    ///
    /// Reads the key count once to seed the append counter. Call
    /// [`LedgerApi::initialize`](crate::LedgerApi::initialize) afterwards to
    /// ensure genesis exists.
    pub async fn open(
        deps: LedgerDependencies<KV, TS>,
        config: LedgerConfig,
    ) -> Result<Self, LedgerError> {
        let next_height = deps.store.count().await?;
        Ok(Self {
            store: deps.store,
            time_source: deps.time_source,
            config,
            next_height: Mutex::new(next_height),
        })
    }

    /// Shared handle to the underlying store.
    pub fn store(&self) -> Arc<KV> {
        Arc::clone(&self.store)
    }

    /// Fetch and decode the value stored under `height`, whatever height the
    /// decoded block claims.
    pub(crate) async fn read_stored(&self, height: u64) -> Result<Block, LedgerError> {
        match self.store.get(&height_key(height)).await {
            Ok(raw) => Ok(Block::from_canonical_bytes(&raw)?),
            Err(KVStoreError::NotFound) => Err(LedgerError::NotFound { height }),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch the block at `height`. A block stored under another height's
    /// key is an `InvariantViolation`.
    pub(crate) async fn read_block(&self, height: u64) -> Result<Block, LedgerError> {
        let block = self.read_stored(height).await?;
        if block.height != height {
            return Err(LedgerError::InvariantViolation {
                height,
                reason: format!("stored block claims height {}", block.height),
            });
        }
        Ok(block)
    }

    /// Whether a value is stored at `height`.
    pub(crate) async fn is_occupied(&self, height: u64) -> Result<bool, LedgerError> {
        match self.store.get(&height_key(height)).await {
            Ok(_) => Ok(true),
            Err(KVStoreError::NotFound) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
