//! Blockfrost configuration and wire types.

use serde::{Deserialize, Serialize};

use progtoken_ledger::{Address, Assets, Datum, OutRef, Output, Script, ScriptLanguage, Utxo};
use progtoken_primitives::{PlutusData, PrimitivesError, TxHash, Unit};

use crate::error::BlockfrostError;

/// Configuration for a [`BlockfrostClient`](crate::BlockfrostClient).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockfrostConfig {
    /// Base URL including the API version (e.g. `https://cardano-preview.blockfrost.io/api/v0`).
    pub base_url: String,
    /// Project id sent in the `project_id` header.
    pub project_id: Option<String>,
    /// Items requested per page on paginated endpoints.
    pub page_size: u32,
    /// Upper bound on pages fetched for one query.
    pub max_pages: u32,
}

impl Default for BlockfrostConfig {
    fn default() -> Self {
        Self {
            base_url: "https://cardano-preview.blockfrost.io/api/v0".to_string(),
            project_id: None,
            page_size: 100,
            max_pages: 100,
        }
    }
}

/// One entry of an output's `amount` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BfAmount {
    /// `lovelace` or `hex(policy) ++ hex(name)`.
    pub unit: String,
    /// Decimal quantity.
    pub quantity: String,
}

/// An unspent output as returned by `/addresses/{address}/utxos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BfUtxo {
    /// Address holding the output.
    pub address: String,
    /// Creating transaction.
    pub tx_hash: String,
    /// Output position within the transaction.
    pub output_index: u32,
    /// Value held.
    pub amount: Vec<BfAmount>,
    /// Datum hash, if any.
    #[serde(default)]
    pub data_hash: Option<String>,
    /// CBOR hex of the inline datum, if any.
    #[serde(default)]
    pub inline_datum: Option<String>,
    /// Hash of the reference script, if any.
    #[serde(default)]
    pub reference_script_hash: Option<String>,
}

impl BfUtxo {
    /// Convert into the ledger model. `script_ref` is the resolved
    /// reference script, looked up separately by hash.
    pub fn into_utxo(self, script_ref: Option<Script>) -> Result<Utxo, BlockfrostError> {
        let out_ref = OutRef::new(TxHash::from_hex(&self.tx_hash)?, self.output_index);

        let mut assets = Assets::new();
        for amount in &self.amount {
            let unit: Unit = amount.unit.parse()?;
            let quantity: u64 = amount.quantity.parse().map_err(|_| {
                BlockfrostError::InvalidResponse(format!(
                    "quantity {:?} of {} in {out_ref}",
                    amount.quantity, amount.unit
                ))
            })?;
            let total = assets
                .get(&unit)
                .checked_add(quantity)
                .ok_or_else(|| BlockfrostError::InvalidResponse(format!("{} overflows", amount.unit)))?;
            assets.insert(unit, total);
        }

        let datum = match (self.inline_datum, self.data_hash) {
            (Some(cbor), _) => Some(Datum::Inline(PlutusData::from_hex(&cbor)?)),
            (None, Some(hash)) => Some(Datum::Hash(hex::decode(hash).map_err(PrimitivesError::from)?)),
            (None, None) => None,
        };

        let output = Output { address: Address::new(self.address), assets, datum, script_ref };
        Ok(Utxo::new(out_ref, output))
    }
}

/// One holder of an asset, from `/assets/{unit}/addresses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAddress {
    /// Holding address.
    pub address: String,
    /// Decimal quantity held.
    pub quantity: String,
}

/// Asset details, from `/assets/{unit}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetInfo {
    /// Concatenated policy id and hex asset name.
    pub asset: String,
    /// Policy id.
    pub policy_id: String,
    /// Hex asset name.
    #[serde(default)]
    pub asset_name: Option<String>,
    /// Metadata attached at mint time.
    #[serde(default)]
    pub onchain_metadata: Option<serde_json::Value>,
}

/// Script details, from `/scripts/{hash}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptInfo {
    /// Script hash.
    pub script_hash: String,
    /// `timelock`, `plutusV1`, `plutusV2` or `plutusV3`.
    #[serde(rename = "type")]
    pub script_type: String,
}

impl ScriptInfo {
    /// The script language named by `script_type`.
    pub fn language(&self) -> Result<ScriptLanguage, BlockfrostError> {
        match self.script_type.as_str() {
            "timelock" => Ok(ScriptLanguage::Native),
            "plutusV1" => Ok(ScriptLanguage::PlutusV1),
            "plutusV2" => Ok(ScriptLanguage::PlutusV2),
            "plutusV3" => Ok(ScriptLanguage::PlutusV3),
            other => Err(BlockfrostError::InvalidResponse(format!("unknown script type {other}"))),
        }
    }
}

/// Script bytes, from `/scripts/{hash}/cbor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptCbor {
    /// CBOR hex; absent for native scripts.
    pub cbor: Option<String>,
}
