//! Shared types for content addressing.

use serde::Serialize;

/// 32-byte SHA256 digest used as content address
pub type Hash = [u8; 32];

/// Convert hash to hex string
pub fn to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

/// Convert hex string to hash
pub fn from_hex(hex_str: &str) -> Result<Hash, hex::FromHexError> {
    let bytes = hex::decode(hex_str)?;
    if bytes.len() != 32 {
        return Err(hex::FromHexError::InvalidStringLength);
    }
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&bytes);
    Ok(hash)
}

/// Proof of one successful submission to the storage network.
///
/// Created once per upload and returned to the caller; the gateway keeps no
/// copy after the response is written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    /// Merkle root of the submitted blob, hex encoded
    pub root_hash: String,
    /// Transaction reference returned by the network
    pub tx_hash: String,
    /// Filename as supplied by the uploader
    pub original_name: String,
    /// Blob length in bytes
    pub size: u64,
}
