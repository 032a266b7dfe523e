//! # Ledger Node
//!
//! Process wrapper around `ledger-core`: configuration, the HTTP request
//! layer and startup of the single ledger instance.
//!
//! ## Startup Sequence
//!
//! 1. Install logging
//! 2. Load and validate configuration (defaults + `LEDGER_*` env)
//! 3. Open the file-backed store (exclusive lock, log replay)
//! 4. Open the ledger and ensure genesis exists
//! 5. Serve HTTP until Ctrl-C

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod routes;

pub use config::{ConfigError, NodeConfig};
pub use routes::{router, ApiError, AppState};
