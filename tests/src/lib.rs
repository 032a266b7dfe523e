//! # Ledger Test Suite
//!
//! Cross-crate tests for the ledger.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── chain_properties.rs  # Properties that hold for any append sequence
//!     ├── concurrency.rs       # Parallel appends and validation
//!     └── file_store.rs        # Chains on disk: reopen, torn tail, lock
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ledger-tests
//! cargo test -p ledger-tests integration::file_store::
//! ```

pub mod integration;
