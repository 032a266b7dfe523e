//! # Block Entity
//!
//! One immutable ledger entry and its content hash.
//!
//! ## Canonical Form
//!
//! A block serializes to compact JSON with the keys in declaration order:
//!
//! ```text
//! {"hash":"…","height":1,"body":"…","time":1546300800,"previousBlockHash":"…"}
//! ```
//!
//! The same bytes are persisted as the store value and, with `hash` set to
//! `""`, hashed with SHA-256 to produce the content hash (INVARIANT-3).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::Timestamp;

/// Height of the genesis block.
pub const GENESIS_HEIGHT: u64 = 0;

/// Fixed payload carried by the genesis block (INVARIANT-1).
pub const GENESIS_BODY: &str = "First block in the chain - Genesis block";

/// A single ledger entry.
///
/// Callers only ever supply `body`. The engine assigns `height`, `time`,
/// `previous_block_hash` and `hash` before the block is first persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Hex SHA-256 over the canonical form with this field blank.
    pub hash: String,
    /// Ordinal position in the chain, also the store key.
    pub height: u64,
    /// Opaque caller payload.
    pub body: String,
    /// Creation time in whole Unix seconds.
    pub time: Timestamp,
    /// Hash of the block at `height - 1`, empty for genesis.
    pub previous_block_hash: String,
}

impl Block {
    /// Create an unsealed block carrying `body`.
    ///
    /// Identity fields stay empty until [`Block::seal`] is called.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            hash: String::new(),
            height: GENESIS_HEIGHT,
            body: body.into(),
            time: 0,
            previous_block_hash: String::new(),
        }
    }

    /// Create the unsealed genesis block.
    pub fn genesis() -> Self {
        Self::new(GENESIS_BODY)
    }

    /// Assign identity fields and compute the content hash.
    pub fn seal(
        mut self,
        height: u64,
        time: Timestamp,
        previous_block_hash: impl Into<String>,
    ) -> Result<Self, serde_json::Error> {
        self.height = height;
        self.time = time;
        self.previous_block_hash = previous_block_hash.into();
        self.hash = compute_content_hash(&self)?;
        Ok(self)
    }

    /// Copy of this block with `hash` cleared. The original is untouched.
    pub fn with_hash_cleared(&self) -> Self {
        Self {
            hash: String::new(),
            ..self.clone()
        }
    }

    /// Canonical serialization, used for persistence and hashing.
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode a block from its persisted form.
    pub fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Recompute the content hash and compare it with the stored one.
    pub fn has_valid_content_hash(&self) -> Result<bool, serde_json::Error> {
        Ok(compute_content_hash(self)? == self.hash)
    }

    /// Whether this block sits at the genesis height.
    pub fn is_genesis(&self) -> bool {
        self.height == GENESIS_HEIGHT
    }
}

/// Compute the content hash of `block`.
///
/// The digest covers the canonical form of a copy whose `hash` is empty, so
/// the result does not depend on whatever `hash` currently holds.
pub fn compute_content_hash(block: &Block) -> Result<String, serde_json::Error> {
    let preimage = block.with_hash_cleared().to_canonical_bytes()?;
    Ok(hex::encode(Sha256::digest(&preimage)))
}
