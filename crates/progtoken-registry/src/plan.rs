//! The immutable transaction plan handed to signers.

use progtoken_ledger::{OutRef, Output, Script, Utxo};
use progtoken_primitives::{AssetName, KeyHash, PolicyId, ScriptHash};

use crate::redeemer::Redeemer;
use crate::reference_set::SortedReferenceSet;

/// An input to consume.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedSpend {
    /// The output being spent.
    pub utxo: Utxo,
    /// Spending redeemer, for script-locked outputs.
    pub redeemer: Option<Redeemer>,
}

/// Tokens minted under one policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedMint {
    /// Minting policy.
    pub policy: PolicyId,
    /// Asset names and quantities.
    pub assets: Vec<(AssetName, u64)>,
    /// Minting redeemer.
    pub redeemer: Redeemer,
}

/// A zero-amount withdrawal that invokes a staking script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedWithdrawal {
    /// Script whose reward credential is withdrawn from.
    pub credential: ScriptHash,
    /// Always zero in these flows.
    pub amount: u64,
    /// Redeemer passed to the script.
    pub redeemer: Redeemer,
}

impl PlannedWithdrawal {
    /// A zero withdrawal from `credential`.
    pub fn zero(credential: ScriptHash, redeemer: Redeemer) -> Self {
        PlannedWithdrawal { credential, amount: 0, redeemer }
    }
}

/// Everything needed to build one transaction.
///
/// Plans are all-or-nothing: a plan exists only if every stage succeeded.
/// Withdrawals are listed in invocation order, global logic first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferPlan {
    pub(crate) spends: Vec<PlannedSpend>,
    pub(crate) reference_inputs: SortedReferenceSet,
    pub(crate) outputs: Vec<Output>,
    pub(crate) mints: Vec<PlannedMint>,
    pub(crate) withdrawals: Vec<PlannedWithdrawal>,
    pub(crate) attached_scripts: Vec<Script>,
    pub(crate) required_signers: Vec<KeyHash>,
}

impl TransferPlan {
    /// Inputs to consume.
    pub fn spends(&self) -> &[PlannedSpend] {
        &self.spends
    }

    /// Reference inputs, in the order redeemer indices refer to.
    pub fn reference_inputs(&self) -> &SortedReferenceSet {
        &self.reference_inputs
    }

    /// Outputs to create.
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Mints.
    pub fn mints(&self) -> &[PlannedMint] {
        &self.mints
    }

    /// Withdrawals, in invocation order.
    pub fn withdrawals(&self) -> &[PlannedWithdrawal] {
        &self.withdrawals
    }

    /// Scripts to include in the witness set.
    pub fn attached_scripts(&self) -> &[Script] {
        &self.attached_scripts
    }

    /// Keys that must sign.
    pub fn required_signers(&self) -> &[KeyHash] {
        &self.required_signers
    }

    /// Output references of every spent input.
    pub fn spent_refs(&self) -> Vec<OutRef> {
        self.spends.iter().map(|s| s.utxo.out_ref).collect()
    }
}
