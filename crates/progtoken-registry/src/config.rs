//! Deployment coordinates and per-call requests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use progtoken_ledger::{Address, Assets, Script, Utxo};
use progtoken_primitives::{AssetName, KeyHash, PlutusData, PolicyId, Unit};

use crate::error::RegistryError;
use crate::redeemer::TransferRule;

/// Asset name of the protocol-parameters NFT.
pub const PROTOCOL_PARAMS_TOKEN_NAME: &[u8] = b"ProtocolParams";

/// Scripts and addresses of one protocol deployment, shared by every flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolConfig {
    /// Policy of the protocol-parameters NFT.
    pub protocol_params_policy: PolicyId,
    /// Address holding the directory nodes.
    pub directory_address: Address,
    /// Directory node minting policy; its hash is the directory policy id.
    pub directory_node_mint: Script,
    /// Spending validator guarding directory nodes.
    pub directory_spend: Script,
    /// Spending validator guarding every programmable-token address.
    pub programmable_logic_base: Script,
    /// Withdrawal validator checking every programmable transfer.
    pub programmable_logic_global: Script,
}

impl ProtocolConfig {
    /// Unit of the protocol-parameters NFT.
    pub fn protocol_params_unit(&self) -> Result<Unit, RegistryError> {
        let name = AssetName::new(PROTOCOL_PARAMS_TOKEN_NAME.to_vec())?;
        Ok(Unit::asset(self.protocol_params_policy, name))
    }
}

/// A request to move programmable tokens.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Bundle to pay to the recipient.
    pub assets: Assets,
    /// The sender's programmable-token address.
    pub sender_address: Address,
    /// Key that owns the sender's address.
    pub sender_key_hash: KeyHash,
    /// The recipient's programmable-token address.
    pub recipient_address: Address,
    /// Optional inline datum for the recipient output.
    pub recipient_datum: Option<PlutusData>,
    /// Registered policies: unit marking the output that carries each
    /// policy's transfer-logic reference script.
    pub ref_script_units: BTreeMap<PolicyId, Unit>,
    /// Transfer rule of each registered policy.
    pub transfer_rules: BTreeMap<PolicyId, TransferRule>,
    /// Extra reference inputs the transfer scripts need.
    pub additional_reference_inputs: Vec<Utxo>,
}

impl TransferConfig {
    /// A request with no registered policies and no extra references.
    pub fn new(
        assets: Assets,
        sender_address: Address,
        sender_key_hash: KeyHash,
        recipient_address: Address,
    ) -> Self {
        TransferConfig {
            assets,
            sender_address,
            sender_key_hash,
            recipient_address,
            recipient_datum: None,
            ref_script_units: BTreeMap::new(),
            transfer_rules: BTreeMap::new(),
            additional_reference_inputs: Vec::new(),
        }
    }

    /// Declare `policy` registered, with its reference script at `ref_script_unit`.
    pub fn with_registered(mut self, policy: PolicyId, ref_script_unit: Unit, rule: TransferRule) -> Self {
        self.ref_script_units.insert(policy, ref_script_unit);
        self.transfer_rules.insert(policy, rule);
        self
    }

    /// Add an extra reference input.
    pub fn with_reference_input(mut self, utxo: Utxo) -> Self {
        self.additional_reference_inputs.push(utxo);
        self
    }

    /// Returns `true` if the caller declared `policy` registered.
    pub fn is_registered(&self, policy: &PolicyId) -> bool {
        self.ref_script_units.contains_key(policy)
    }
}

/// A request to register a new programmable token.
#[derive(Debug, Clone)]
pub struct RegisterConfig {
    /// Name of the token to mint.
    pub token_name: AssetName,
    /// Quantity to mint.
    pub mint_amount: u64,
    /// Minting policy of the token; its hash is the new directory key.
    pub minting_policy: Script,
    /// Transfer logic recorded in the new node.
    pub transfer_logic: Script,
    /// Issuer logic recorded in the new node.
    pub issuer_logic: Script,
    /// Withdrawal script that authorizes the mint.
    pub minting_logic: Script,
    /// The owner's programmable-token address.
    pub owner_address: Address,
}

/// A request to create the directory's HEAD node.
#[derive(Debug, Clone)]
pub struct InitDirectoryConfig {
    /// Output consumed to make the directory policy one-shot.
    pub seed: Utxo,
}
