use std::collections::BTreeMap;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::RwLock;

use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{EntryStream, KeyValueStore};

/// In-memory key-value store.
///
/// Used by unit tests and throwaway nodes. Keys are kept sorted so `stream`
/// yields entries in key order.
#[derive(Default)]
pub struct InMemoryKVStore {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl InMemoryKVStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKVStore {
    async fn get(&self, key: &[u8]) -> Result<Vec<u8>, KVStoreError> {
        self.data.read().get(key).cloned().ok_or(KVStoreError::NotFound)
    }

    async fn put(&self, key: &[u8], value: &[u8]) -> Result<Vec<u8>, KVStoreError> {
        let mut data = self.data.write();
        data.insert(key.to_vec(), value.to_vec());
        data.get(key).cloned().ok_or(KVStoreError::NotFound)
    }

    async fn count(&self) -> Result<u64, KVStoreError> {
        Ok(self.data.read().len() as u64)
    }

    fn stream(&self) -> EntryStream<'_> {
        let snapshot: Vec<(Vec<u8>, Vec<u8>)> = self
            .data
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        stream::iter(snapshot.into_iter().map(Ok)).boxed()
    }
}
