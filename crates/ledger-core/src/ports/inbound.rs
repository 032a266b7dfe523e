//! # Inbound Ports (Driving Ports)
//!
//! The public contract of the ledger engine.
//!
//! Nothing here mutates or deletes an existing block. Fault injection for
//! tests goes through `test_utils::TamperHarness`, which works on the store.

use async_trait::async_trait;

use crate::domain::block::Block;
use crate::domain::errors::{IntegrityViolation, LedgerError};

/// Primary API of the ledger.
///
/// Implementations must uphold the domain invariants listed in the crate
/// docs.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Ensure the genesis block exists.
    ///
    /// Idempotent: appends genesis only when height 0 is absent and is a
    /// no-op otherwise.
    async fn initialize(&self) -> Result<(), LedgerError>;

    /// Number of blocks in the chain (highest height + 1).
    async fn height(&self) -> Result<u64, LedgerError>;

    /// Append a new block carrying `body` at the next height.
    ///
    /// ## Errors
    ///
    /// - `StoreFailure`: The store could not read or persist the block
    /// - `InvariantViolation`: The predecessor is missing or the target
    ///   height is already occupied; nothing was written
    async fn append(&self, body: String) -> Result<Block, LedgerError>;

    /// Read the block at `height`.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: No block at this height (any height >= chain length)
    /// - `InvariantViolation`: The stored block claims a different height
    async fn get_block(&self, height: u64) -> Result<Block, LedgerError>;

    /// Check the self-hash of the block at `height`.
    ///
    /// A block stored under another height's key is reported as `false`.
    /// Linkage is not checked here; see [`LedgerApi::validate_chain`].
    async fn validate_block(&self, height: u64) -> Result<bool, LedgerError>;

    /// Check every stored entry: it decodes, claims the height of its key,
    /// reproduces its own hash and links to the block under the previous key.
    ///
    /// Returns every violation found, sorted by height. An empty list means
    /// the chain is intact.
    async fn validate_chain(&self) -> Result<Vec<IntegrityViolation>, LedgerError>;
}
