//! # Ports Layer
//!
//! Defines the port traits for the ledger.
//!
//! ## Hexagonal Architecture
//!
//! - `inbound.rs` - Driving port (`LedgerApi`, what the request layer calls)
//! - `outbound.rs` - Driven ports (`KeyValueStore`, `TimeSource`)

pub mod inbound;
pub mod outbound;
