//! Directory initialization and token registration.

use progtoken_ledger::{Assets, Credential, Output};
use progtoken_primitives::{AssetName, PlutusData, PolicyId, Unit};

use crate::client::LedgerClient;
use crate::config::{InitDirectoryConfig, ProtocolConfig, RegisterConfig};
use crate::directory::{node_output, node_unit, Directory, DirectoryKey, DirectoryNode};
use crate::error::RegistryError;
use crate::plan::{PlannedMint, PlannedSpend, PlannedWithdrawal, TransferPlan};
use crate::planner::plan_insertion;
use crate::redeemer::Redeemer;
use crate::reference_set::{build_sorted_reference_set, SortedReferenceSet};

/// A registration plan and the policy id it registers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    /// The transaction plan.
    pub plan: TransferPlan,
    /// Policy id of the newly registered token.
    pub policy_id: PolicyId,
}

/// Redeemer of the directory minting policy when inserting `policy`.
fn insert_node_redeemer(policy: &PolicyId) -> Redeemer {
    Redeemer::new(PlutusData::constr(1, vec![PlutusData::bytes(policy.as_bytes().to_vec())]))
}

/// Plan the registration of a new programmable token.
///
/// The plan reads the protocol-parameters output, spends the directory node
/// whose interval contains the new policy id, mints the token and the new
/// node's NFT, pays the token to the owner's programmable address, writes
/// the new node and the re-linked predecessor back to the directory, and
/// invokes the minting-logic script with a zero withdrawal.
///
/// # Errors
/// * [`RegistryError::EmptyTransfer`] if `mint_amount` is zero.
/// * [`RegistryError::DuplicateKey`] if the policy is already registered.
/// * Any consistency error from loading the directory snapshot.
#[tracing::instrument(skip_all, fields(token = %config.token_name.to_hex()))]
pub async fn register_programmable_token<C>(
    client: &C,
    protocol: &ProtocolConfig,
    config: &RegisterConfig,
) -> Result<Registration, RegistryError>
where
    C: LedgerClient + Sync,
{
    if config.mint_amount == 0 {
        return Err(RegistryError::EmptyTransfer);
    }

    let policy_id = client.script_hash_of(&config.minting_policy)?;
    let directory_policy = client.script_hash_of(&protocol.directory_node_mint)?;
    let transfer_logic = Credential::script(client.script_hash_of(&config.transfer_logic)?);
    let issuer_logic = Credential::script(client.script_hash_of(&config.issuer_logic)?);
    let minting_logic = client.script_hash_of(&config.minting_logic)?;

    let params_unit = protocol.protocol_params_unit()?;
    let (params_utxo, directory_outputs) = futures::try_join!(
        client.output_by_unit(&params_unit),
        client.outputs_at(&protocol.directory_address),
    )?;
    let directory = Directory::from_outputs(&directory_policy, directory_outputs)?;
    directory.validate()?;

    let key = DirectoryKey::from(policy_id);
    let insertion = plan_insertion(&key, transfer_logic, issuer_logic, directory.entries())?;
    tracing::debug!(
        nodes = directory.len(),
        predecessor = %insertion.predecessor.node.key,
        "insertion point found"
    );

    let token = Unit::asset(policy_id, config.token_name.clone());
    let owner_output = Output::new(
        config.owner_address.clone(),
        Assets::new().with(token, config.mint_amount),
    );
    let new_node = node_output(&protocol.directory_address, &directory_policy, &insertion.inserted)?;
    let relinked = Output::new(
        protocol.directory_address.clone(),
        insertion.predecessor.utxo.output.assets.clone(),
    )
    .with_inline_datum(insertion.updated.to_data());

    let plan = TransferPlan {
        spends: vec![PlannedSpend {
            utxo: insertion.predecessor.utxo.clone(),
            redeemer: Some(Redeemer::void()),
        }],
        reference_inputs: build_sorted_reference_set([params_utxo]),
        outputs: vec![owner_output, new_node, relinked],
        mints: vec![
            PlannedMint {
                policy: policy_id,
                assets: vec![(config.token_name.clone(), config.mint_amount)],
                redeemer: Redeemer::new(PlutusData::integer(0)),
            },
            PlannedMint {
                policy: directory_policy,
                assets: vec![(AssetName::from(policy_id), 1)],
                redeemer: insert_node_redeemer(&policy_id),
            },
        ],
        withdrawals: vec![PlannedWithdrawal::zero(minting_logic, Redeemer::void())],
        attached_scripts: vec![
            protocol.directory_node_mint.clone(),
            config.minting_policy.clone(),
            protocol.directory_spend.clone(),
            config.minting_logic.clone(),
        ],
        required_signers: Vec::new(),
    };
    tracing::info!(policy = %policy_id, "registration planned");
    Ok(Registration { plan, policy_id })
}

/// Plan the creation of the directory's HEAD node.
///
/// Consumes the seed output, mints the directory NFT with the empty asset
/// name and pays it to the directory address under the HEAD datum
/// `("", TAIL, Key(""), Key(""))`.
///
/// # Errors
/// [`RegistryError::DuplicateKey`] if a HEAD node already exists.
#[tracing::instrument(skip_all, fields(seed = %config.seed.out_ref))]
pub async fn plan_directory_init<C>(
    client: &C,
    protocol: &ProtocolConfig,
    config: &InitDirectoryConfig,
) -> Result<TransferPlan, RegistryError>
where
    C: LedgerClient + Sync,
{
    let directory_policy = client.script_hash_of(&protocol.directory_node_mint)?;
    let head = DirectoryNode::head();
    let head_unit = node_unit(&directory_policy, &head.key)?;
    let existing = client.outputs_at_with_unit(&protocol.directory_address, &head_unit).await?;
    if !existing.is_empty() {
        return Err(RegistryError::DuplicateKey(head.key));
    }

    let plan = TransferPlan {
        spends: vec![PlannedSpend { utxo: config.seed.clone(), redeemer: None }],
        reference_inputs: SortedReferenceSet::default(),
        outputs: vec![node_output(&protocol.directory_address, &directory_policy, &head)?],
        mints: vec![PlannedMint {
            policy: directory_policy,
            assets: vec![(AssetName::empty(), 1)],
            redeemer: Redeemer::void(),
        }],
        withdrawals: Vec::new(),
        attached_scripts: vec![protocol.directory_node_mint.clone()],
        required_signers: Vec::new(),
    };
    tracing::info!(policy = %directory_policy, "directory initialization planned");
    Ok(plan)
}
