//! Programmable token SDK - Hashes, asset units and Plutus data.
//!
//! This crate provides the foundational building blocks shared by every
//! other `progtoken` crate:
//! - Blake2b digests and script hashing
//! - Transaction hash type for output references
//! - 28-byte policy / script / key hashes, asset names and asset units
//! - Plutus `Data` values with their canonical CBOR encoding

pub mod hash;
pub mod txhash;
pub mod policy;
pub mod data;
pub mod serde_hex;

mod error;
pub use error::PrimitivesError;
pub use txhash::TxHash;
pub use policy::{AssetName, Hash28, KeyHash, PolicyId, ScriptHash, Unit};
pub use data::PlutusData;
pub use num_bigint::BigInt;
