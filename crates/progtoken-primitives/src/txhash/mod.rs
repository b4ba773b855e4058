//! Transaction hash type for output references.
//!
//! Provides `TxHash`, the 32-byte Blake2b-256 digest of a transaction
//! body. Unlike Bitcoin-family chains the bytes are displayed in natural
//! order, so the hex string and the byte array sort identically.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PrimitivesError;

/// Size of a TxHash in bytes.
pub const TX_HASH_SIZE: usize = 32;

/// A 32-byte transaction identifier.
///
/// `Ord` is plain byte-lexicographic order. Reference-input ordering on the
/// ledger is defined over this order, so it must never be changed to
/// compare anything other than the raw bytes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct TxHash([u8; TX_HASH_SIZE]);

impl TxHash {
    /// Create a TxHash from a raw 32-byte array.
    pub fn new(bytes: [u8; TX_HASH_SIZE]) -> Self {
        TxHash(bytes)
    }

    /// Create a TxHash from a byte slice.
    ///
    /// # Arguments
    /// * `bytes` - A slice that must be exactly 32 bytes.
    ///
    /// # Returns
    /// `Ok(TxHash)` if the slice is 32 bytes, or an error otherwise.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != TX_HASH_SIZE {
            return Err(PrimitivesError::InvalidHash(format!(
                "invalid tx hash length of {}, want {}",
                bytes.len(),
                TX_HASH_SIZE
            )));
        }
        let mut arr = [0u8; TX_HASH_SIZE];
        arr.copy_from_slice(bytes);
        Ok(TxHash(arr))
    }

    /// Create a TxHash from a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let decoded = hex::decode(hex_str)?;
        Self::from_bytes(&decoded)
    }

    /// Access the internal byte array.
    pub fn as_bytes(&self) -> &[u8; TX_HASH_SIZE] {
        &self.0
    }

    /// Return the lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for TxHash {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TxHash::from_hex(s)
    }
}

/// Serialize as a hex string in JSON.
impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Deserialize from a hex string in JSON.
impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TxHash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "6f2a1cbe3a9c27b25f7f3f3fb5b4c3e44ddf9e0b54da4e0b1c7fd3a1b1d5e3c2";

    #[test]
    fn hex_roundtrip_keeps_natural_byte_order() {
        let hash = TxHash::from_hex(SAMPLE).unwrap();
        assert_eq!(hash.as_bytes()[0], 0x6f);
        assert_eq!(hash.to_string(), SAMPLE);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(TxHash::from_hex("abcd").is_err());
        assert!(TxHash::from_bytes(&[0u8; 31]).is_err());
    }

    #[test]
    fn ordering_matches_hex_ordering() {
        let a = TxHash::new([0x0a; 32]);
        let b = TxHash::new([0xa0; 32]);
        assert!(a < b);
        assert!(a.to_hex() < b.to_hex());
    }

    #[test]
    fn serde_roundtrip() {
        let hash = TxHash::from_hex(SAMPLE).unwrap();
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{SAMPLE}\""));
        let restored: TxHash = serde_json::from_str(&json).unwrap();
        assert_eq!(hash, restored);
    }
}
