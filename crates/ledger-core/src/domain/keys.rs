//! # Store Keys
//!
//! Blocks are keyed by height. Keys are 8-byte big-endian so that byte order
//! in the store equals height order.

use super::errors::KVStoreError;

/// Length of an encoded height key.
pub const HEIGHT_KEY_LEN: usize = 8;

/// Encode a height as a store key.
pub fn height_key(height: u64) -> [u8; HEIGHT_KEY_LEN] {
    height.to_be_bytes()
}

/// Decode a store key back into a height.
pub fn height_from_key(key: &[u8]) -> Result<u64, KVStoreError> {
    let bytes: [u8; HEIGHT_KEY_LEN] = key.try_into().map_err(|_| KVStoreError::CorruptionError {
        message: format!("Invalid height key length: {}", key.len()),
    })?;
    Ok(u64::from_be_bytes(bytes))
}
