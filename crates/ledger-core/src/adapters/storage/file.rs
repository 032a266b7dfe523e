use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::RwLock;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::adapters::lock::ChainLock;
use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{EntryStream, KeyValueStore};

/// File-backed key-value store.
///
/// Persists every `put` as one record appended to a log file:
///
/// ```text
/// [key_len:u32 LE][key][value_len:u32 LE][value]
/// ```
///
/// On open the log is replayed into memory (later records win) and a torn
/// trailing record, left by a crash mid-write, is cut off. A failed `put`
/// cuts the log back to its last complete record before returning. The data
/// file is locked exclusively for as long as the store lives.
pub struct FileBackedKVStore {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    log: Mutex<RecordLog>,
    path: PathBuf,
    _lock: ChainLock,
}

/// Write side of the log file.
struct RecordLog {
    file: File,
    /// Length of the prefix made of complete, synced records.
    len: u64,
    /// Set when a failed write could not be rolled back.
    failed: bool,
}

impl RecordLog {
    async fn append(&mut self, record: &[u8]) -> Result<(), KVStoreError> {
        if self.failed {
            return Err(KVStoreError::IOError {
                message: "ledger file has an unrecoverable partial write".to_string(),
            });
        }
        self.discard_tail().await?;

        if let Err(e) = self.write_synced(record).await {
            if let Err(rollback) = self.discard_tail().await {
                tracing::error!(error = %rollback, "failed to roll back partial record");
                self.failed = true;
            }
            return Err(e.into());
        }

        self.len += record.len() as u64;
        Ok(())
    }

    async fn write_synced(&mut self, record: &[u8]) -> std::io::Result<()> {
        self.file.write_all(record).await?;
        self.file.flush().await?;
        self.file.sync_data().await
    }

    /// Cut off bytes past the last complete record.
    async fn discard_tail(&mut self) -> Result<(), KVStoreError> {
        let actual = self.file.metadata().await?.len();
        if actual < self.len {
            return Err(KVStoreError::CorruptionError {
                message: format!(
                    "ledger file shrank to {} bytes, expected {}",
                    actual, self.len
                ),
            });
        }
        if actual > self.len {
            tracing::warn!(
                discarded = actual - self.len,
                "truncating partial record at end of ledger file"
            );
            self.file.set_len(self.len).await?;
            self.file.sync_data().await?;
        }
        Ok(())
    }
}

impl FileBackedKVStore {
    /// Open (or create) the store at `path`.
    ///
    /// # Errors
    ///
    /// - `Locked`: Another store already owns this file
    /// - `IOError`: The file could not be read, truncated or opened
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, KVStoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let lock = ChainLock::acquire(&path)?;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                tracing::info!(
                    path = %path.display(),
                    bytes = bytes.len(),
                    "found existing ledger file"
                );
                bytes
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no existing ledger file, starting empty");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        let (data, valid_len) = decode_records(&bytes);

        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        if (valid_len as usize) < bytes.len() {
            tracing::warn!(
                path = %path.display(),
                discarded = bytes.len() - valid_len as usize,
                "truncating torn record at end of ledger file"
            );
            log.set_len(valid_len).await?;
            log.sync_all().await?;
        }

        tracing::info!(
            path = %path.display(),
            keys = data.len(),
            lock = %lock.path().display(),
            pid = lock.pid(),
            "ledger file loaded"
        );

        Ok(Self {
            data: RwLock::new(data),
            log: Mutex::new(RecordLog {
                file: log,
                len: valid_len,
                failed: false,
            }),
            path,
            _lock: lock,
        })
    }

    /// Path of the data file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl KeyValueStore for FileBackedKVStore {
    async fn get(&self, key: &[u8]) -> Result<Vec<u8>, KVStoreError> {
        self.data.read().get(key).cloned().ok_or(KVStoreError::NotFound)
    }

    async fn put(&self, key: &[u8], value: &[u8]) -> Result<Vec<u8>, KVStoreError> {
        let record = encode_record(key, value)?;

        // Held across the write so records never interleave.
        self.log.lock().await.append(&record).await?;

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

fn encode_record(key: &[u8], value: &[u8]) -> Result<Vec<u8>, KVStoreError> {
    let too_large = |what: &str, len: usize| KVStoreError::SerializationError {
        message: format!("{} of {} bytes exceeds record limit", what, len),
    };
    let key_len = u32::try_from(key.len()).map_err(|_| too_large("key", key.len()))?;
    let value_len = u32::try_from(value.len()).map_err(|_| too_large("value", value.len()))?;

    let mut bytes = Vec::with_capacity(8 + key.len() + value.len());
    bytes.extend_from_slice(&key_len.to_le_bytes());
    bytes.extend_from_slice(key);
    bytes.extend_from_slice(&value_len.to_le_bytes());
    bytes.extend_from_slice(value);
    Ok(bytes)
}

/// Replay a record log. Returns the resulting map and the length of the
/// prefix made of complete records.
fn decode_records(bytes: &[u8]) -> (BTreeMap<Vec<u8>, Vec<u8>>, u64) {
    let mut data = BTreeMap::new();
    let mut cursor = 0;

    while let Some((key, value, next)) = decode_record(bytes, cursor) {
        data.insert(key.to_vec(), value.to_vec());
        cursor = next;
    }

    (data, cursor as u64)
}

fn decode_record(bytes: &[u8], start: usize) -> Option<(&[u8], &[u8], usize)> {
    let (key, cursor) = read_chunk(bytes, start)?;
    let (value, cursor) = read_chunk(bytes, cursor)?;
    Some((key, value, cursor))
}

fn read_chunk(bytes: &[u8], start: usize) -> Option<(&[u8], usize)> {
    let len_end = start.checked_add(4)?;
    let len = u32::from_le_bytes(bytes.get(start..len_end)?.try_into().ok()?) as usize;
    let end = len_end.checked_add(len)?;
    Some((bytes.get(len_end..end)?, end))
}
