//! # Test Utilities
//!
//! Fixtures shared by unit tests and the `ledger-tests` crate. Only compiled
//! with `cfg(test)` or the `test-utils` feature.
//!
//! [`TamperHarness`] is the only way to change a stored block. It writes to
//! the store directly and is not reachable through `LedgerApi`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use futures::FutureExt;

use crate::adapters::InMemoryKVStore;
use crate::config::LedgerConfig;
use crate::domain::block::{compute_content_hash, Block};
use crate::domain::errors::{KVStoreError, LedgerError};
use crate::domain::keys::height_key;
use crate::domain::Timestamp;
use crate::ports::outbound::{EntryStream, KeyValueStore, TimeSource};
use crate::service::{Ledger, LedgerDependencies};

/// 2019-01-01T00:00:00Z
pub const FIXED_TIME: Timestamp = 1_546_300_800;

/// Clock that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource(pub Timestamp);

impl Default for FixedTimeSource {
    fn default() -> Self {
        Self(FIXED_TIME)
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> Timestamp {
        self.0
    }
}

/// Open a ledger over a fresh in-memory store with a fixed clock.
pub async fn make_test_ledger() -> Ledger<InMemoryKVStore, FixedTimeSource> {
    make_test_ledger_on(Arc::new(InMemoryKVStore::new())).await
}

/// Open a ledger over `store` with a fixed clock.
pub async fn make_test_ledger_on<KV: KeyValueStore>(store: Arc<KV>) -> Ledger<KV, FixedTimeSource> {
    let deps = LedgerDependencies {
        store,
        time_source: FixedTimeSource::default(),
    };
    match Ledger::open(deps, LedgerConfig::for_testing()).await {
        Ok(ledger) => ledger,
        Err(e) => panic!("failed to open test ledger: {}", e),
    }
}

/// Fault injection on stored blocks.
pub struct TamperHarness<KV> {
    store: Arc<KV>,
}

impl<KV: KeyValueStore> TamperHarness<KV> {
    /// Wrap a store shared with the ledger under test.
    pub fn new(store: Arc<KV>) -> Self {
        Self { store }
    }

    /// Read the stored block at `height`.
    pub async fn read(&self, height: u64) -> Result<Block, LedgerError> {
        match self.store.get(&height_key(height)).await {
            Ok(raw) => Ok(Block::from_canonical_bytes(&raw)?),
            Err(KVStoreError::NotFound) => Err(LedgerError::NotFound { height }),
            Err(e) => Err(e.into()),
        }
    }

    /// Store `block` under its own height exactly as given.
    pub async fn overwrite_block(&self, block: &Block) -> Result<(), LedgerError> {
        self.substitute(block.height, block).await
    }

    /// Store `block` under the key for `height`, whatever height the block
    /// itself claims.
    pub async fn substitute(&self, height: u64, block: &Block) -> Result<(), LedgerError> {
        self.store
            .put(&height_key(height), &block.to_canonical_bytes()?)
            .await?;
        Ok(())
    }

    /// Replace the body at `height`, leaving the stored hash stale.
    pub async fn rewrite_body(&self, height: u64, body: &str) -> Result<Block, LedgerError> {
        let mut block = self.read(height).await?;
        block.body = body.to_string();
        self.overwrite_block(&block).await?;
        Ok(block)
    }

    /// Replace the body at `height` and recompute its hash, so the block is
    /// self-consistent but its successor's link breaks.
    pub async fn rewrite_body_and_rehash(
        &self,
        height: u64,
        body: &str,
    ) -> Result<Block, LedgerError> {
        let mut block = self.read(height).await?;
        block.body = body.to_string();
        block.hash = compute_content_hash(&block)?;
        self.overwrite_block(&block).await?;
        Ok(block)
    }

    /// Point the block at `height` to a different predecessor hash and
    /// recompute its own hash.
    pub async fn relink(&self, height: u64, previous_block_hash: &str) -> Result<Block, LedgerError> {
        let mut block = self.read(height).await?;
        block.previous_block_hash = previous_block_hash.to_string();
        block.hash = compute_content_hash(&block)?;
        self.overwrite_block(&block).await?;
        Ok(block)
    }
}

/// In-memory store whose operations can be made to fail on demand.
#[derive(Default)]
pub struct FailingStore {
    inner: InMemoryKVStore,
    fail_get: AtomicBool,
    fail_put: AtomicBool,
    fail_count: AtomicBool,
    fail_stream: AtomicBool,
}

impl FailingStore {
    /// Create a store that does not fail yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `get` fail.
    pub fn fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    /// Make `put` fail without writing.
    pub fn fail_put(&self, fail: bool) {
        self.fail_put.store(fail, Ordering::SeqCst);
    }

    /// Make `count` fail.
    pub fn fail_count(&self, fail: bool) {
        self.fail_count.store(fail, Ordering::SeqCst);
    }

    /// Make the entry stream yield an error after its first entry.
    pub fn fail_stream(&self, fail: bool) {
        self.fail_stream.store(fail, Ordering::SeqCst);
    }

    fn injected(flag: &AtomicBool) -> Result<(), KVStoreError> {
        if flag.load(Ordering::SeqCst) {
            return Err(KVStoreError::IOError {
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, key: &[u8]) -> Result<Vec<u8>, KVStoreError> {
        Self::injected(&self.fail_get)?;
        self.inner.get(key).await
    }

    async fn put(&self, key: &[u8], value: &[u8]) -> Result<Vec<u8>, KVStoreError> {
        Self::injected(&self.fail_put)?;
        self.inner.put(key, value).await
    }

    async fn count(&self) -> Result<u64, KVStoreError> {
        Self::injected(&self.fail_count)?;
        self.inner.count().await
    }

    fn stream(&self) -> EntryStream<'_> {
        if self.fail_stream.load(Ordering::SeqCst) {
            let failure = stream::once(async {
                Err(KVStoreError::IOError {
                    message: "injected stream failure".to_string(),
                })
            });
            return self.inner.stream().take(1).chain(failure).boxed();
        }
        self.inner.stream()
    }
}

/// In-memory store that streams entries in descending key order.
#[derive(Default)]
pub struct ReversedStreamStore {
    inner: InMemoryKVStore,
}

impl ReversedStreamStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for ReversedStreamStore {
    async fn get(&self, key: &[u8]) -> Result<Vec<u8>, KVStoreError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &[u8], value: &[u8]) -> Result<Vec<u8>, KVStoreError> {
        self.inner.put(key, value).await
    }

    async fn count(&self) -> Result<u64, KVStoreError> {
        self.inner.count().await
    }

    fn stream(&self) -> EntryStream<'_> {
        self.inner
            .stream()
            .try_collect::<Vec<_>>()
            .map(|collected| {
                let items: Vec<Result<(Vec<u8>, Vec<u8>), KVStoreError>> = match collected {
                    Ok(mut entries) => {
                        entries.reverse();
                        entries.into_iter().map(Ok).collect()
                    }
                    Err(e) => vec![Err(e)],
                };
                stream::iter(items)
            })
            .flatten_stream()
            .boxed()
    }
}
