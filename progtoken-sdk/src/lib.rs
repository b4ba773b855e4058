#![deny(missing_docs)]

//! Programmable token SDK.
//!
//! Re-exports all progtoken components for convenient single-crate usage.

pub use progtoken_primitives as primitives;
pub use progtoken_ledger as ledger;
pub use progtoken_registry as registry;
pub use progtoken_blockfrost as blockfrost;
