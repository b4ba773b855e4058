//! Capabilities the planners consume from the outside world.
//!
//! The core never talks to a node, an indexer or a wallet directly. It reads
//! ledger state through [`LedgerClient`] and hands finished plans to a
//! [`PlanSigner`] and a [`Submitter`]. Implementations own transport,
//! retries and timeouts.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;

use progtoken_ledger::{Address, Script, Utxo};
use progtoken_primitives::{ScriptHash, TxHash, Unit};

use crate::error::RegistryError;
use crate::plan::TransferPlan;

/// An error raised by a collaborator, carried through the core untouched.
pub struct ClientError(Box<dyn StdError + Send + Sync + 'static>);

impl ClientError {
    /// Box any error as a client error.
    pub fn new(err: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        ClientError(err.into())
    }

    /// Recover the collaborator's own error.
    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync + 'static> {
        self.0
    }
}

impl fmt::Debug for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl StdError for ClientError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

/// Read access to ledger state.
pub trait LedgerClient {
    /// All unspent outputs at `address`.
    fn outputs_at(
        &self,
        address: &Address,
    ) -> impl Future<Output = Result<Vec<Utxo>, ClientError>> + Send;

    /// The single unspent output holding `unit`.
    fn output_by_unit(&self, unit: &Unit) -> impl Future<Output = Result<Utxo, ClientError>> + Send;

    /// Unspent outputs at `address` that hold `unit`.
    fn outputs_at_with_unit(
        &self,
        address: &Address,
        unit: &Unit,
    ) -> impl Future<Output = Result<Vec<Utxo>, ClientError>> + Send;

    /// Hash of a script.
    fn script_hash_of(&self, script: &Script) -> Result<ScriptHash, ClientError> {
        Ok(script.hash())
    }
}

/// A signed transaction ready for submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTx {
    /// Serialized transaction.
    pub cbor: Vec<u8>,
}

impl SignedTx {
    /// Hex of the serialized transaction.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.cbor)
    }
}

/// Turns a plan into a balanced, signed transaction.
pub trait PlanSigner {
    /// Build, balance and sign `plan`.
    fn sign(&self, plan: &TransferPlan) -> impl Future<Output = Result<SignedTx, ClientError>> + Send;
}

/// Sends signed transactions to the network.
pub trait Submitter {
    /// Submit `tx` and return its id.
    fn submit(&self, tx: &SignedTx) -> impl Future<Output = Result<TxHash, ClientError>> + Send;
}

/// Sign `plan` with `signer` and submit the result through `submitter`.
pub async fn submit_plan<S, B>(
    signer: &S,
    submitter: &B,
    plan: &TransferPlan,
) -> Result<TxHash, RegistryError>
where
    S: PlanSigner + Sync,
    B: Submitter + Sync,
{
    let signed = signer.sign(plan).await?;
    tracing::debug!(bytes = signed.cbor.len(), "plan signed");
    let tx_hash = submitter.submit(&signed).await?;
    tracing::info!(%tx_hash, "transaction submitted");
    Ok(tx_hash)
}
