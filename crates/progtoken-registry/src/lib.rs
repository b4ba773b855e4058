#![deny(missing_docs)]

//! # progtoken-registry
//!
//! Directory maintenance, proof construction and transaction planning for
//! programmable tokens.
//!
//! The directory is an ordered set of token policies stored on the ledger
//! as a linked list of outputs. Every transfer proves, for each policy it
//! moves, either that the policy has a node (membership) or which node's
//! interval would contain it (non-membership). Proofs are encoded as
//! indices into the transaction's sorted reference inputs, so the sort
//! order here must match the one validators compute on-chain.
//!
//! Ledger access goes through the [`LedgerClient`] capability; planners
//! return an immutable [`TransferPlan`] and never sign or submit.
//!
//! # Example
//!
//! ```no_run
//! use progtoken_registry::{transfer_programmable_token, LedgerClient, ProtocolConfig, TransferConfig};
//!
//! async fn plan<C: LedgerClient + Sync>(
//!     client: &C,
//!     protocol: &ProtocolConfig,
//!     request: &TransferConfig,
//! ) -> Result<(), progtoken_registry::RegistryError> {
//!     let plan = transfer_programmable_token(client, protocol, request).await?;
//!     println!("{} reference inputs", plan.reference_inputs().len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod directory;
pub mod error;
pub mod plan;
pub mod planner;
pub mod proof;
pub mod redeemer;
pub mod reference_set;
pub mod register;
pub mod selection;
pub mod transfer;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;


pub use client::{submit_plan, ClientError, LedgerClient, PlanSigner, SignedTx, Submitter};
pub use config::{InitDirectoryConfig, ProtocolConfig, RegisterConfig, TransferConfig};
pub use directory::{Directory, DirectoryEntry, DirectoryKey, DirectoryNode};
pub use error::RegistryError;
pub use plan::{PlannedMint, PlannedSpend, PlannedWithdrawal, TransferPlan};
pub use planner::{find_insertion_point, plan_insertion, InsertionPlan};
pub use proof::{classify, ProofEntry, ProofKind};
pub use redeemer::{
    decode_global_redeemer, encode_global_redeemer, encode_per_policy_redeemer, ProofTag, Redeemer,
    SelectionCriteria, TransferRule,
};
pub use reference_set::{build_sorted_reference_set, SortedReferenceSet};
pub use register::{plan_directory_init, register_programmable_token, Registration};
pub use selection::{select_utxos, Selection};
pub use transfer::{transfer_programmable_token, TransferStage};
