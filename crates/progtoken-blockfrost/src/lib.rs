#![deny(missing_docs)]

//! # progtoken-blockfrost
//!
//! Blockfrost-compatible chain indexer client. Implements the registry's
//! [`LedgerClient`](progtoken_registry::LedgerClient) and
//! [`Submitter`](progtoken_registry::Submitter) capabilities over HTTP.
//!
//! # Example
//!
//! ```no_run
//! use progtoken_blockfrost::{BlockfrostClient, BlockfrostConfig};
//!
//! let client = BlockfrostClient::new(BlockfrostConfig {
//!     project_id: Some("previewXXXXXXXX".to_string()),
//!     ..Default::default()
//! });
//! ```

pub mod client;
pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

pub use client::{BlockfrostClient, REF_UTXO_TOKEN_FIELD};
pub use error::BlockfrostError;
pub use types::{AssetAddress, AssetInfo, BfAmount, BfUtxo, BlockfrostConfig, ScriptCbor, ScriptInfo};
