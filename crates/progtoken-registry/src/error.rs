//! Registry error types.

use progtoken_ledger::{LedgerError, OutRef};
use progtoken_primitives::{PolicyId, PrimitivesError, ScriptHash};

use crate::client::ClientError;
use crate::directory::DirectoryKey;

/// Errors that can occur while planning directory or transfer transactions.
///
/// Every error aborts the whole plan; nothing is partially returned. Use
/// [`is_input_error`](Self::is_input_error) and
/// [`is_consistency_error`](Self::is_consistency_error) to decide between
/// fixing the request and re-fetching a fresh ledger snapshot.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The sender's programmable outputs cannot cover the request.
    #[error("insufficient funds: {unit} needed {needed}, available {available}")]
    InsufficientFunds {
        /// Unit that cannot be covered.
        unit: String,
        /// Quantity requested.
        needed: u64,
        /// Quantity available across all candidate outputs.
        available: u64,
    },

    /// A registered policy is moved without a transfer rule for it.
    #[error("no transfer authority supplied for registered policy {0}")]
    MissingTransferAuthority(PolicyId),

    /// The key to insert already has a directory node.
    #[error("key {0} is already registered in the directory")]
    DuplicateKey(DirectoryKey),

    /// Two policies share a transfer-logic script but need different redeemers.
    ///
    /// A transaction withdraws from each reward credential at most once.
    #[error("transfer-logic script {0} is invoked with conflicting redeemers")]
    ConflictingWithdrawal(ScriptHash),

    /// The request moves or mints nothing.
    #[error("request holds no assets")]
    EmptyTransfer,

    /// No directory node's interval contains the key.
    #[error("no directory node covers key {0}")]
    NoInsertionPoint(DirectoryKey),

    /// A directory output does not hold a well-formed node.
    #[error("malformed directory node: {0}")]
    MalformedNode(String),

    /// The directory nodes do not form one ordered chain from HEAD to TAIL.
    #[error("broken directory chain: {0}")]
    BrokenChain(String),

    /// A key is claimed registered by the caller but the snapshot disagrees.
    #[error("key {0} classifies as both registered and unregistered")]
    AmbiguousProof(PolicyId),

    /// A transfer rule did not select exactly one reference input.
    #[error("transfer rule for {policy} matched {matches} reference inputs, expected exactly one")]
    NoMatchingReference {
        /// Policy whose rule was evaluated.
        policy: PolicyId,
        /// Number of references the rule accepted.
        matches: usize,
    },

    /// A proof cites a reference that is not in the sorted reference set.
    #[error("reference {0} is not part of the sorted reference set")]
    MissingReference(OutRef),

    /// A transfer-logic reference output carries no reference script.
    #[error("reference {0} carries no reference script")]
    MissingScriptRef(OutRef),

    /// A redeemer does not have the expected shape.
    #[error("malformed redeemer: {0}")]
    MalformedRedeemer(String),

    /// A ledger collaborator failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Ledger model error.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Primitives error.
    #[error(transparent)]
    Primitives(#[from] PrimitivesError),
}

impl RegistryError {
    /// Caller-correctable errors: retrying with the same request cannot succeed.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            RegistryError::InsufficientFunds { .. }
                | RegistryError::MissingTransferAuthority(_)
                | RegistryError::DuplicateKey(_)
                | RegistryError::ConflictingWithdrawal(_)
                | RegistryError::EmptyTransfer
        )
    }

    /// Errors caused by a corrupt or stale snapshot: rebuild from fresh state.
    pub fn is_consistency_error(&self) -> bool {
        matches!(
            self,
            RegistryError::NoInsertionPoint(_)
                | RegistryError::MalformedNode(_)
                | RegistryError::BrokenChain(_)
                | RegistryError::AmbiguousProof(_)
                | RegistryError::NoMatchingReference { .. }
                | RegistryError::MissingReference(_)
                | RegistryError::MissingScriptRef(_)
        )
    }
}
