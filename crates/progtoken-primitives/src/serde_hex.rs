//! Serde helpers that represent byte vectors as lowercase hex strings.
//!
//! Use with `#[serde(with = "progtoken_primitives::serde_hex")]`.

use serde::{Deserialize, Deserializer, Serializer};

/// Serialize a byte slice as a hex string.
pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&hex::encode(bytes))
}

/// Deserialize a hex string into a byte vector.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    hex::decode(s).map_err(serde::de::Error::custom)
}
