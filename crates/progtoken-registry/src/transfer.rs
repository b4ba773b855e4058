//! Transfer planning: the linear pipeline that turns a transfer request
//! into a [`TransferPlan`].
//!
//! ```text
//! Validate -> CollectInputs -> ClassifyProofs -> BuildReferenceSet -> EncodeRedeemers -> AssemblePlan
//! ```
//!
//! Each stage either hands its result to the next or aborts the whole plan.
//! Ledger reads for independent references run concurrently, but every read
//! completes before the reference set is sorted.

use std::collections::BTreeMap;
use std::fmt;

use futures::future::try_join_all;

use progtoken_ledger::{Output, Utxo};
use progtoken_primitives::PolicyId;

use crate::client::LedgerClient;
use crate::config::{ProtocolConfig, TransferConfig};
use crate::directory::{node_unit, Directory, DirectoryEntry, DirectoryKey};
use crate::error::RegistryError;
use crate::plan::{PlannedSpend, PlannedWithdrawal, TransferPlan};
use crate::proof::classify;
use crate::redeemer::{encode_global_redeemer, encode_per_policy_redeemer, Redeemer};
use crate::reference_set::build_sorted_reference_set;
use crate::selection::select_utxos;

/// Stages of the transfer pipeline, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferStage {
    /// Request checks that need no ledger access.
    Validate,
    /// Coin selection over the sender's programmable outputs.
    CollectInputs,
    /// Membership and non-membership proofs for every moved policy.
    ClassifyProofs,
    /// Gathering and sorting every reference input.
    BuildReferenceSet,
    /// Global and per-policy redeemers.
    EncodeRedeemers,
    /// Final inputs, outputs and script invocations.
    AssemblePlan,
}

impl fmt::Display for TransferStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransferStage::Validate => "Validate",
            TransferStage::CollectInputs => "CollectInputs",
            TransferStage::ClassifyProofs => "ClassifyProofs",
            TransferStage::BuildReferenceSet => "BuildReferenceSet",
            TransferStage::EncodeRedeemers => "EncodeRedeemers",
            TransferStage::AssemblePlan => "AssemblePlan",
        };
        f.write_str(name)
    }
}

/// Plan a transfer of programmable tokens.
///
/// # Arguments
/// * `client` - Ledger read access.
/// * `protocol` - Deployment coordinates.
/// * `config` - The transfer request.
///
/// # Returns
/// A plan that spends the selected sender outputs, pays the requested bundle
/// to the recipient and any surplus back to the sender's programmable
/// address, and invokes the global logic script followed by the transfer
/// script of every registered policy moved.
///
/// # Errors
/// Input errors are raised before any ledger read, except those that
/// depend on ledger state: [`RegistryError::InsufficientFunds`] and
/// [`RegistryError::ConflictingWithdrawal`] when two policies share a
/// transfer-logic script but need different redeemers.
///
/// Consistency errors mean the ledger snapshot changed or is corrupt;
/// rebuild the plan from scratch.
#[tracing::instrument(
    skip_all,
    fields(sender = %config.sender_address, recipient = %config.recipient_address)
)]
pub async fn transfer_programmable_token<C>(
    client: &C,
    protocol: &ProtocolConfig,
    config: &TransferConfig,
) -> Result<TransferPlan, RegistryError>
where
    C: LedgerClient + Sync,
{
    // Validate
    if config.assets.is_empty() {
        return Err(RegistryError::EmptyTransfer);
    }
    let policies = config.assets.policies();
    if let Some(policy) = policies
        .iter()
        .find(|p| config.is_registered(p) && !config.transfer_rules.contains_key(*p))
    {
        return Err(RegistryError::MissingTransferAuthority(*policy));
    }
    let registered: Vec<PolicyId> =
        policies.iter().copied().filter(|p| config.is_registered(p)).collect();
    tracing::debug!(
        stage = %TransferStage::Validate,
        policies = policies.len(),
        registered = registered.len(),
        "request accepted"
    );

    // CollectInputs
    let sender_utxos = client.outputs_at(&config.sender_address).await?;
    let selection = select_utxos(&sender_utxos, &config.assets)?;
    tracing::debug!(
        stage = %TransferStage::CollectInputs,
        candidates = sender_utxos.len(),
        selected = selection.inputs.len(),
        "inputs selected"
    );

    // ClassifyProofs
    let directory_policy = client.script_hash_of(&protocol.directory_node_mint)?;
    let memberships = try_join_all(
        registered
            .iter()
            .map(|policy| membership_reference(client, protocol, &directory_policy, *policy)),
    )
    .await?;
    let memberships: BTreeMap<PolicyId, Utxo> = memberships.into_iter().collect();

    let snapshot: Vec<DirectoryEntry> = if registered.len() < policies.len() {
        let outputs = client.outputs_at(&protocol.directory_address).await?;
        let directory = Directory::from_outputs(&directory_policy, outputs)?;
        directory.validate()?;
        directory.entries().to_vec()
    } else {
        Vec::new()
    };
    let proofs = classify(&policies, &memberships, &snapshot)?;
    tracing::debug!(
        stage = %TransferStage::ClassifyProofs,
        members = proofs.iter().filter(|p| p.is_member()).count(),
        absent = proofs.iter().filter(|p| !p.is_member()).count(),
        "proofs classified"
    );

    // BuildReferenceSet
    let params_unit = protocol.protocol_params_unit()?;
    let (params_utxo, logic_refs) = futures::try_join!(
        async { client.output_by_unit(&params_unit).await.map_err(RegistryError::from) },
        try_join_all(registered.iter().map(|policy| logic_reference(client, config, *policy))),
    )?;
    let references = build_sorted_reference_set(
        proofs
            .iter()
            .map(|p| p.reference.clone())
            .chain(std::iter::once(params_utxo))
            .chain(config.additional_reference_inputs.iter().cloned())
            .chain(logic_refs.iter().map(|(_, utxo)| utxo.clone())),
    );
    let sorted: Vec<String> = references.out_refs().iter().map(ToString::to_string).collect();
    tracing::debug!(
        stage = %TransferStage::BuildReferenceSet,
        references = ?sorted,
        "reference inputs sorted"
    );

    // EncodeRedeemers
    let global = encode_global_redeemer(&proofs, &references)?;
    let mut withdrawals = vec![PlannedWithdrawal::zero(
        client.script_hash_of(&protocol.programmable_logic_global)?,
        global,
    )];
    for (policy, logic_utxo) in &logic_refs {
        let script = logic_utxo
            .output
            .script_ref
            .as_ref()
            .ok_or(RegistryError::MissingScriptRef(logic_utxo.out_ref))?;
        let rule = config
            .transfer_rules
            .get(policy)
            .ok_or(RegistryError::MissingTransferAuthority(*policy))?;
        let redeemer = encode_per_policy_redeemer(policy, &references, rule)?;
        let credential = client.script_hash_of(script)?;
        // Policies sharing a script share its single withdrawal.
        match withdrawals.iter().find(|w| w.credential == credential) {
            Some(existing) if existing.redeemer == redeemer => {}
            Some(_) => return Err(RegistryError::ConflictingWithdrawal(credential)),
            None => withdrawals.push(PlannedWithdrawal::zero(credential, redeemer)),
        }
    }
    tracing::debug!(
        stage = %TransferStage::EncodeRedeemers,
        withdrawals = withdrawals.len(),
        "redeemers encoded"
    );

    // AssemblePlan
    let mut recipient = Output::new(config.recipient_address.clone(), config.assets.clone());
    if let Some(datum) = &config.recipient_datum {
        recipient = recipient.with_inline_datum(datum.clone());
    }
    let mut outputs = vec![recipient];
    if !selection.change.is_empty() {
        outputs.push(Output::new(config.sender_address.clone(), selection.change.clone()));
    }

    let plan = TransferPlan {
        spends: selection
            .inputs
            .into_iter()
            .map(|utxo| PlannedSpend { utxo, redeemer: Some(Redeemer::void()) })
            .collect(),
        reference_inputs: references,
        outputs,
        mints: Vec::new(),
        withdrawals,
        attached_scripts: vec![
            protocol.programmable_logic_global.clone(),
            protocol.programmable_logic_base.clone(),
        ],
        required_signers: vec![config.sender_key_hash],
    };
    tracing::info!(
        stage = %TransferStage::AssemblePlan,
        inputs = plan.spends.len(),
        outputs = plan.outputs.len(),
        "transfer planned"
    );
    Ok(plan)
}

/// The directory node of a policy the caller declared registered.
async fn membership_reference<C>(
    client: &C,
    protocol: &ProtocolConfig,
    directory_policy: &PolicyId,
    policy: PolicyId,
) -> Result<(PolicyId, Utxo), RegistryError>
where
    C: LedgerClient + Sync,
{
    let unit = node_unit(directory_policy, &DirectoryKey::from(policy))?;
    let mut found = client.outputs_at_with_unit(&protocol.directory_address, &unit).await?;
    match found.len() {
        0 => Err(RegistryError::AmbiguousProof(policy)),
        1 => Ok((policy, found.remove(0))),
        n => Err(RegistryError::BrokenChain(format!("{n} directory nodes hold the NFT of {policy}"))),
    }
}

/// The output carrying a registered policy's transfer-logic script.
async fn logic_reference<C>(
    client: &C,
    config: &TransferConfig,
    policy: PolicyId,
) -> Result<(PolicyId, Utxo), RegistryError>
where
    C: LedgerClient + Sync,
{
    let unit = config
        .ref_script_units
        .get(&policy)
        .ok_or(RegistryError::MissingTransferAuthority(policy))?;
    let utxo = client.output_by_unit(unit).await?;
    Ok((policy, utxo))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names() {
        let names: Vec<String> = [
            TransferStage::Validate,
            TransferStage::CollectInputs,
            TransferStage::ClassifyProofs,
            TransferStage::BuildReferenceSet,
            TransferStage::EncodeRedeemers,
            TransferStage::AssemblePlan,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(
            names,
            [
                "Validate",
                "CollectInputs",
                "ClassifyProofs",
                "BuildReferenceSet",
                "EncodeRedeemers",
                "AssemblePlan"
            ]
        );
    }
}
