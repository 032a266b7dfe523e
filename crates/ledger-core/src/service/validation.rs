//! Whole-chain validation.
//!
//! Every streamed entry is checked against the height its key encodes: the
//! value must decode, claim that height, reproduce its own hash and, above
//! genesis, link to the block stored under the previous key. Checks run with
//! bounded concurrency and the result is produced only once all of them
//! finished.

use futures::TryStreamExt;

use super::Ledger;
use crate::domain::block::{Block, GENESIS_HEIGHT};
use crate::domain::errors::{IntegrityCheck, IntegrityViolation, KVStoreError, LedgerError};
use crate::domain::keys::{height_from_key, height_key};
use crate::ports::outbound::{KeyValueStore, TimeSource};

impl<KV, TS> Ledger<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    pub(crate) async fn scan_chain(&self) -> Result<Vec<IntegrityViolation>, LedgerError> {
        let concurrency = self.config.validation_concurrency.max(1);

        let per_block: Vec<Vec<IntegrityViolation>> = self
            .store
            .stream()
            .map_err(LedgerError::from)
            .map_ok(|(key, raw)| self.check_stored(key, raw))
            .try_buffer_unordered(concurrency)
            .try_collect()
            .await?;

        let mut violations: Vec<IntegrityViolation> = per_block.into_iter().flatten().collect();
        violations.sort();
        Ok(violations)
    }

    async fn check_stored(
        &self,
        key: Vec<u8>,
        raw: Vec<u8>,
    ) -> Result<Vec<IntegrityViolation>, LedgerError> {
        let height = height_from_key(&key)?;
        let Ok(block) = Block::from_canonical_bytes(&raw) else {
            return Ok(vec![IntegrityViolation::new(height, IntegrityCheck::Undecodable)]);
        };

        let mut violations = Vec::new();
        let mut flag = |check| violations.push(IntegrityViolation::new(height, check));

        if block.height != height {
            flag(IntegrityCheck::HeightMismatch);
        }
        if !block.has_valid_content_hash()? {
            flag(IntegrityCheck::ContentHash);
        }

        if height != GENESIS_HEIGHT {
            match self.store.get(&height_key(height - 1)).await {
                Ok(previous) => {
                    let linked = Block::from_canonical_bytes(&previous)
                        .is_ok_and(|previous| previous.hash == block.previous_block_hash);
                    if !linked {
                        flag(IntegrityCheck::Linkage);
                    }
                }
                Err(KVStoreError::NotFound) => flag(IntegrityCheck::MissingPredecessor),
                Err(e) => return Err(e.into()),
            }
        }

        Ok(violations)
    }
}
