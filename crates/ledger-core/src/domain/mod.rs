//! # Domain Layer
//!
//! Pure domain logic for the ledger. No I/O happens here.
//!
//! ## Modules
//!
//! - `block` - The Block entity, its canonical form and content hash
//! - `errors` - Ledger and store error types, integrity descriptors
//! - `keys` - Height <-> store key encoding

pub mod block;
pub mod errors;
pub mod keys;

/// Unix timestamp in seconds since epoch.
pub type Timestamp = u64;
