//! Programmable token SDK - UTxO ledger model.
//!
//! Provides the ledger-agnostic value types the registry core works on:
//! output references, multi-asset bundles, credentials, scripts, outputs
//! and resolved UTxOs. Nothing in this crate performs I/O.

pub mod outref;
pub mod assets;
pub mod credential;
pub mod script;
pub mod output;

mod error;
pub use error::LedgerError;
pub use outref::OutRef;
pub use assets::Assets;
pub use credential::Credential;
pub use script::{Script, ScriptLanguage};
pub use output::{Address, Datum, Output, Utxo};
