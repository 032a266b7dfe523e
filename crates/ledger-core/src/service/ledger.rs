//! `LedgerApi` implementation: initialization, appends and reads.

use async_trait::async_trait;

use super::Ledger;
use crate::domain::block::{Block, GENESIS_BODY, GENESIS_HEIGHT};
use crate::domain::errors::{IntegrityViolation, LedgerError};
use crate::domain::keys::height_key;
use crate::ports::inbound::LedgerApi;
use crate::ports::outbound::{KeyValueStore, TimeSource};

impl<KV, TS> Ledger<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    /// Append at `*next_height`. The caller holds the append lock.
    async fn append_locked(
        &self,
        next_height: &mut u64,
        body: String,
    ) -> Result<Block, LedgerError> {
        let height = *next_height;

        let previous_block_hash = if height == GENESIS_HEIGHT {
            String::new()
        } else {
            match self.read_block(height - 1).await {
                Ok(previous) => previous.hash,
                Err(LedgerError::NotFound { .. }) => {
                    return Err(LedgerError::InvariantViolation {
                        height,
                        reason: format!("predecessor block {} is missing", height - 1),
                    })
                }
                Err(e) => return Err(e),
            }
        };

        if self.is_occupied(height).await? {
            return Err(LedgerError::InvariantViolation {
                height,
                reason: "height is already occupied".to_string(),
            });
        }

        let block = Block::new(body).seal(height, self.time_source.now(), previous_block_hash)?;
        let stored = self
            .store
            .put(&height_key(height), &block.to_canonical_bytes()?)
            .await?;
        let block = Block::from_canonical_bytes(&stored)?;

        *next_height = height + 1;
        Ok(block)
    }
}

#[async_trait]
impl<KV, TS> LedgerApi for Ledger<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    async fn initialize(&self) -> Result<(), LedgerError> {
        let mut next_height = self.next_height.lock().await;

        if self.is_occupied(GENESIS_HEIGHT).await? {
            return Ok(());
        }
        if *next_height != GENESIS_HEIGHT {
            return Err(LedgerError::InvariantViolation {
                height: GENESIS_HEIGHT,
                reason: format!("genesis missing from a store holding {} blocks", *next_height),
            });
        }

        self.append_locked(&mut next_height, GENESIS_BODY.to_string())
            .await
            .map(|_| ())
    }

    async fn height(&self) -> Result<u64, LedgerError> {
        Ok(self.store.count().await?)
    }

    async fn append(&self, body: String) -> Result<Block, LedgerError> {
        let mut next_height = self.next_height.lock().await;
        self.append_locked(&mut next_height, body).await
    }

    async fn get_block(&self, height: u64) -> Result<Block, LedgerError> {
        self.read_block(height).await
    }

    async fn validate_block(&self, height: u64) -> Result<bool, LedgerError> {
        let block = self.read_stored(height).await?;
        Ok(block.height == height && block.has_valid_content_hash()?)
    }

    async fn validate_chain(&self) -> Result<Vec<IntegrityViolation>, LedgerError> {
        self.scan_chain().await
    }
}
