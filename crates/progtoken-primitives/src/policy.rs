//! Policy identifiers, asset names and asset units.
//!
//! A minting policy id is the hash of its script, so [`PolicyId`],
//! [`ScriptHash`] and [`KeyHash`] share one 28-byte representation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PrimitivesError;

/// Size of a script, key or policy hash in bytes.
pub const HASH28_SIZE: usize = 28;

/// Maximum length of an asset name in bytes.
pub const MAX_ASSET_NAME_LEN: usize = 32;

/// A 28-byte Blake2b-224 hash.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Hash28([u8; HASH28_SIZE]);

/// Hash of a script; also the id of a minting policy.
pub type ScriptHash = Hash28;

/// Id of a minting policy.
pub type PolicyId = Hash28;

/// Hash of a verification key.
pub type KeyHash = Hash28;

impl Hash28 {
    /// Create a hash from a raw 28-byte array.
    pub fn new(bytes: [u8; HASH28_SIZE]) -> Self {
        Hash28(bytes)
    }

    /// Create a hash from a byte slice of exactly 28 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != HASH28_SIZE {
            return Err(PrimitivesError::InvalidHash(format!(
                "invalid hash length of {}, want {}",
                bytes.len(),
                HASH28_SIZE
            )));
        }
        let mut arr = [0u8; HASH28_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Hash28(arr))
    }

    /// Create a hash from a 56-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let decoded = hex::decode(hex_str)?;
        Self::from_bytes(&decoded)
    }

    /// Access the internal byte array.
    pub fn as_bytes(&self) -> &[u8; HASH28_SIZE] {
        &self.0
    }

    /// Return the lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Hash28 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Hash28 {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash28::from_hex(s)
    }
}

impl Serialize for Hash28 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash28 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash28::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// An asset name: up to 32 arbitrary bytes.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct AssetName(Vec<u8>);

impl AssetName {
    /// Create an asset name from raw bytes.
    ///
    /// # Returns
    /// An error if the name is longer than 32 bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, PrimitivesError> {
        let bytes = bytes.into();
        if bytes.len() > MAX_ASSET_NAME_LEN {
            return Err(PrimitivesError::InvalidAssetName(format!(
                "{} bytes exceeds maximum of {}",
                bytes.len(),
                MAX_ASSET_NAME_LEN
            )));
        }
        Ok(AssetName(bytes))
    }

    /// Create an asset name from UTF-8 text.
    pub fn from_text(text: &str) -> Result<Self, PrimitivesError> {
        Self::new(text.as_bytes().to_vec())
    }

    /// Create an asset name from its hex encoding.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        Self::new(hex::decode(hex_str)?)
    }

    /// The empty asset name.
    pub fn empty() -> Self {
        AssetName(Vec::new())
    }

    /// Access the name bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Return the lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl From<Hash28> for AssetName {
    /// Directory NFTs are named by the policy id they index.
    fn from(hash: Hash28) -> Self {
        AssetName(hash.as_bytes().to_vec())
    }
}

/// An asset class: either the native coin or a `(policy, name)` pair.
///
/// The string form follows indexer convention: `"lovelace"` for the
/// native coin, otherwise `hex(policy) ++ hex(name)`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Unit {
    /// The native coin.
    Lovelace,
    /// A native token.
    Asset {
        /// Minting policy.
        policy: PolicyId,
        /// Asset name under the policy.
        name: AssetName,
    },
}

impl Unit {
    /// Build a token unit.
    pub fn asset(policy: PolicyId, name: AssetName) -> Self {
        Unit::Asset { policy, name }
    }

    /// The policy of a token unit, `None` for lovelace.
    pub fn policy(&self) -> Option<&PolicyId> {
        match self {
            Unit::Lovelace => None,
            Unit::Asset { policy, .. } => Some(policy),
        }
    }

    /// Returns `true` for the native coin.
    pub fn is_lovelace(&self) -> bool {
        matches!(self, Unit::Lovelace)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Lovelace => write!(f, "lovelace"),
            Unit::Asset { policy, name } => write!(f, "{}{}", policy, name.to_hex()),
        }
    }
}

impl FromStr for Unit {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "lovelace" {
            return Ok(Unit::Lovelace);
        }
        let policy_hex_len = HASH28_SIZE * 2;
        if s.len() < policy_hex_len || !s.is_char_boundary(policy_hex_len) {
            return Err(PrimitivesError::InvalidUnit(s.to_string()));
        }
        let (policy, name) = s.split_at(policy_hex_len);
        Ok(Unit::Asset {
            policy: Hash28::from_hex(policy)?,
            name: AssetName::from_hex(name)?,
        })
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
