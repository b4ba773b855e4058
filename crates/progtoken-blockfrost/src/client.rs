//! Blockfrost HTTP client for UTxO, asset and script queries and transaction submission.

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use progtoken_ledger::{Address, Script, Utxo};
use progtoken_primitives::{AssetName, PolicyId, PrimitivesError, TxHash, Unit};
use progtoken_registry::{ClientError, LedgerClient, SignedTx, Submitter};

use crate::error::BlockfrostError;
use crate::types::{AssetAddress, AssetInfo, BfUtxo, BlockfrostConfig, ScriptCbor, ScriptInfo};

/// Metadata field of a directory NFT naming the unit that marks the
/// transfer-logic reference script output.
pub const REF_UTXO_TOKEN_FIELD: &str = "refUTxOToken";

/// HTTP client for a Blockfrost-compatible chain indexer.
#[derive(Debug, Clone)]
pub struct BlockfrostClient {
    /// Client configuration.
    config: BlockfrostConfig,
    /// Underlying HTTP client.
    client: reqwest::Client,
}

impl BlockfrostClient {
    /// Create a new client with the given configuration.
    pub fn new(config: BlockfrostConfig) -> Self {
        let client = reqwest::Client::new();
        Self { config, client }
    }

    /// All unspent outputs at `address`. An unknown address has none.
    pub async fn utxos_at(&self, address: &str) -> Result<Vec<Utxo>, BlockfrostError> {
        let raw = self.get_pages(&format!("addresses/{address}/utxos")).await?;
        self.resolve(raw).await
    }

    /// Unspent outputs at `address` holding `unit`.
    pub async fn utxos_at_with_unit(
        &self,
        address: &str,
        unit: &Unit,
    ) -> Result<Vec<Utxo>, BlockfrostError> {
        let raw = self.get_pages(&format!("addresses/{address}/utxos/{unit}")).await?;
        self.resolve(raw).await
    }

    /// The single unspent output holding `unit`.
    ///
    /// Intended for NFTs; fails if the unit is spread over several outputs.
    pub async fn utxo_by_unit(&self, unit: &Unit) -> Result<Utxo, BlockfrostError> {
        let holders: Vec<AssetAddress> = self.do_get(&format!("assets/{unit}/addresses")).await?;
        let [holder] = holders.as_slice() else {
            return Err(BlockfrostError::InvalidResponse(format!(
                "{unit} is held at {} addresses",
                holders.len()
            )));
        };
        let mut utxos = self.utxos_at_with_unit(&holder.address, unit).await?;
        if utxos.len() != 1 {
            return Err(BlockfrostError::InvalidResponse(format!(
                "{unit} is held by {} outputs",
                utxos.len()
            )));
        }
        Ok(utxos.remove(0))
    }

    /// Asset details including on-chain mint metadata.
    pub async fn asset_info(&self, unit: &Unit) -> Result<AssetInfo, BlockfrostError> {
        self.do_get(&format!("assets/{unit}")).await
    }

    /// The output carrying the transfer-logic script of `token_policy`.
    ///
    /// Reads the `refUTxOToken` field of the directory NFT's mint metadata
    /// and resolves the output holding that unit.
    pub async fn transfer_logic_reference(
        &self,
        directory_policy: &PolicyId,
        token_policy: &PolicyId,
    ) -> Result<Utxo, BlockfrostError> {
        let directory_nft = Unit::asset(*directory_policy, AssetName::from(*token_policy));
        let info = self.asset_info(&directory_nft).await?;
        let marker = info
            .onchain_metadata
            .as_ref()
            .and_then(|m| m.get(REF_UTXO_TOKEN_FIELD))
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                BlockfrostError::InvalidResponse(format!(
                    "{directory_nft} has no {REF_UTXO_TOKEN_FIELD} metadata"
                ))
            })?;
        let marker: Unit = marker.parse()?;
        self.utxo_by_unit(&marker).await
    }

    /// Fetch a script by hash.
    pub async fn script(&self, hash: &str) -> Result<Script, BlockfrostError> {
        let info: ScriptInfo = self.do_get(&format!("scripts/{hash}")).await?;
        let language = info.language()?;
        let cbor: ScriptCbor = self.do_get(&format!("scripts/{hash}/cbor")).await?;
        let bytes = cbor
            .cbor
            .ok_or_else(|| BlockfrostError::InvalidResponse(format!("script {hash} has no CBOR")))?;
        let bytes = hex::decode(bytes).map_err(PrimitivesError::from)?;
        Ok(Script::new(language, bytes))
    }

    /// Submit a serialized transaction and return its id.
    pub async fn submit_tx(&self, cbor: &[u8]) -> Result<TxHash, BlockfrostError> {
        let url = self.url("tx/submit");
        tracing::debug!(bytes = cbor.len(), "POST tx/submit");

        let resp = self
            .client
            .post(&url)
            .headers(self.build_headers())
            .header(CONTENT_TYPE, "application/cbor")
            .body(cbor.to_vec())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BlockfrostError::ServerError { status_code: status.as_u16(), message });
        }

        let text = resp.text().await?;
        let id: String = serde_json::from_str(&text)?;
        Ok(TxHash::from_hex(&id)?)
    }

    /// Attach reference scripts, fetching each distinct script once.
    ///
    /// Anyone can pay to a script address, so an output whose hashes, units
    /// or datum do not decode is skipped rather than failing the query.
    async fn resolve(&self, raw: Vec<BfUtxo>) -> Result<Vec<Utxo>, BlockfrostError> {
        let mut scripts: BTreeMap<String, Script> = BTreeMap::new();
        let mut utxos = Vec::with_capacity(raw.len());
        for bf in raw {
            let script_ref = match &bf.reference_script_hash {
                Some(hash) => {
                    if !scripts.contains_key(hash) {
                        let script = self.script(hash).await?;
                        scripts.insert(hash.clone(), script);
                    }
                    scripts.get(hash).cloned()
                }
                None => None,
            };
            let out_ref = format!("{}#{}", bf.tx_hash, bf.output_index);
            match bf.into_utxo(script_ref) {
                Ok(utxo) => utxos.push(utxo),
                Err(BlockfrostError::Primitives(e)) => {
                    tracing::warn!(%out_ref, error = %e, "skipping undecodable output");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(utxos)
    }

    /// Follow `?page=` until a short page or `max_pages`. A 404 is an empty result.
    async fn get_pages(&self, path: &str) -> Result<Vec<BfUtxo>, BlockfrostError> {
        let mut all = Vec::new();
        for page in 1..=self.config.max_pages {
            let paged = format!("{path}?count={}&page={page}", self.config.page_size);
            let batch: Vec<BfUtxo> = match self.do_get(&paged).await {
                Ok(batch) => batch,
                Err(BlockfrostError::NotFound) => break,
                Err(e) => return Err(e),
            };
            let short = batch.len() < self.config.page_size as usize;
            all.extend(batch);
            if short {
                break;
            }
        }
        Ok(all)
    }

    /// Perform a GET request and deserialize the response.
    async fn do_get<T: DeserializeOwned>(&self, path: &str) -> Result<T, BlockfrostError> {
        let url = self.url(path);
        tracing::debug!(%path, "GET");

        let resp = self.client.get(&url).headers(self.build_headers()).send().await?;

        let status = resp.status();

        if status.as_u16() == 404 {
            return Err(BlockfrostError::NotFound);
        }

        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BlockfrostError::ServerError {
                status_code: status.as_u16(),
                message,
            });
        }

        let text = resp.text().await?;
        let parsed = serde_json::from_str(&text)?;
        Ok(parsed)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Build common headers from config.
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Some(ref id) = self.config.project_id {
            if let Ok(val) = HeaderValue::from_str(id) {
                headers.insert("project_id", val);
            }
        }

        headers
    }
}

impl LedgerClient for BlockfrostClient {
    async fn outputs_at(&self, address: &Address) -> Result<Vec<Utxo>, ClientError> {
        self.utxos_at(address.as_str()).await.map_err(ClientError::new)
    }

    async fn output_by_unit(&self, unit: &Unit) -> Result<Utxo, ClientError> {
        self.utxo_by_unit(unit).await.map_err(ClientError::new)
    }

    async fn outputs_at_with_unit(
        &self,
        address: &Address,
        unit: &Unit,
    ) -> Result<Vec<Utxo>, ClientError> {
        self.utxos_at_with_unit(address.as_str(), unit).await.map_err(ClientError::new)
    }
}

impl Submitter for BlockfrostClient {
    async fn submit(&self, tx: &SignedTx) -> Result<TxHash, ClientError> {
        self.submit_tx(&tx.cbor).await.map_err(ClientError::new)
    }
}
