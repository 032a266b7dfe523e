//! Integration tests against the public `ledger-core` API.

pub mod chain_properties;
pub mod concurrency;
pub mod file_store;
