//! Directory nodes and the on-chain ordered registry they form.
//!
//! The directory is a sorted singly-linked set stored as ledger outputs.
//! Each node output carries one directory NFT (named by the node key) and
//! an inline datum with the wire shape
//!
//! ```text
//! [ key: bytes, next: bytes, transfer_logic: Credential, issuer_logic: Credential ]
//! ```
//!
//! where the HEAD key is the empty byte string and the TAIL sentinel is
//! 32 bytes of `0xff`. Nodes are held in an arena addressed by key;
//! adjacency exists only through the `next` field.

use std::collections::BTreeMap;
use std::fmt;

use progtoken_ledger::{Address, Assets, Credential, Output, Utxo};
use progtoken_primitives::policy::MAX_ASSET_NAME_LEN;
use progtoken_primitives::{AssetName, Hash28, PlutusData, PolicyId, Unit};

use crate::error::RegistryError;

/// Length of the TAIL sentinel key.
pub const TAIL_KEY_LEN: usize = 32;

/// A directory key: a policy id, or one of the HEAD / TAIL sentinels.
///
/// Ordering is byte-lexicographic, which makes the empty HEAD key the
/// minimum and the all-`0xff` TAIL key the maximum of every policy id.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct DirectoryKey(Vec<u8>);

impl DirectoryKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        DirectoryKey(bytes.into())
    }

    /// The HEAD sentinel (empty key).
    pub fn head() -> Self {
        DirectoryKey(Vec::new())
    }

    /// The TAIL sentinel (32 bytes of `0xff`).
    pub fn tail() -> Self {
        DirectoryKey(vec![0xff; TAIL_KEY_LEN])
    }

    /// Returns `true` for the HEAD sentinel.
    pub fn is_head(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` for the TAIL sentinel.
    pub fn is_tail(&self) -> bool {
        self.0.len() == TAIL_KEY_LEN && self.0.iter().all(|b| *b == 0xff)
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The policy id this key indexes, if it is not a sentinel.
    pub fn to_policy_id(&self) -> Option<PolicyId> {
        Hash28::from_bytes(&self.0).ok()
    }
}

impl From<PolicyId> for DirectoryKey {
    fn from(policy: PolicyId) -> Self {
        DirectoryKey(policy.as_bytes().to_vec())
    }
}

impl fmt::Display for DirectoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_head() {
            write!(f, "HEAD")
        } else if self.is_tail() {
            write!(f, "TAIL")
        } else {
            write!(f, "{}", hex::encode(&self.0))
        }
    }
}

/// The unit of the directory NFT that marks the node for `key`.
pub fn node_unit(directory_policy: &PolicyId, key: &DirectoryKey) -> Result<Unit, RegistryError> {
    let name = AssetName::new(key.as_bytes().to_vec())?;
    Ok(Unit::asset(*directory_policy, name))
}

/// A directory output holding `node` and its NFT.
///
/// The output carries no lovelace; the transaction balancer tops it up to
/// the ledger minimum.
pub fn node_output(
    directory_address: &Address,
    directory_policy: &PolicyId,
    node: &DirectoryNode,
) -> Result<Output, RegistryError> {
    let unit = node_unit(directory_policy, &node.key)?;
    Ok(Output::new(directory_address.clone(), Assets::new().with(unit, 1)).with_inline_datum(node.to_data()))
}

/// One node of the directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryNode {
    /// Key this node represents.
    pub key: DirectoryKey,
    /// Key of the next node, or TAIL.
    pub next: DirectoryKey,
    /// Script governing transfers of the key's token.
    pub transfer_logic: Credential,
    /// Script governing issuance of the key's token.
    pub issuer_logic: Credential,
}

impl DirectoryNode {
    /// The HEAD node of an empty directory.
    pub fn head() -> Self {
        DirectoryNode {
            key: DirectoryKey::head(),
            next: DirectoryKey::tail(),
            transfer_logic: Credential::placeholder(),
            issuer_logic: Credential::placeholder(),
        }
    }

    /// Returns `true` if `key` lies strictly inside `(self.key, self.next)`.
    pub fn covers(&self, key: &DirectoryKey) -> bool {
        self.key < *key && *key < self.next
    }

    /// Encode as the 4-element datum list.
    pub fn to_data(&self) -> PlutusData {
        PlutusData::List(vec![
            PlutusData::bytes(self.key.as_bytes().to_vec()),
            PlutusData::bytes(self.next.as_bytes().to_vec()),
            self.transfer_logic.to_data(),
            self.issuer_logic.to_data(),
        ])
    }

    /// Decode from the 4-element datum list.
    ///
    /// # Errors
    /// [`RegistryError::MalformedNode`] if the shape does not match, a key
    /// is longer than 32 bytes, or `key >= next`.
    pub fn from_data(data: &PlutusData) -> Result<Self, RegistryError> {
        let fields = data
            .as_list()
            .ok_or_else(|| RegistryError::MalformedNode("datum is not a list".into()))?;
        let [key, next, transfer, issuer] = fields else {
            return Err(RegistryError::MalformedNode(format!(
                "expected 4 fields, found {}",
                fields.len()
            )));
        };
        let key = decode_key(key, "key")?;
        let next = decode_key(next, "next")?;
        if key >= next {
            return Err(RegistryError::MalformedNode(format!(
                "node key {key} does not precede its next key {next}"
            )));
        }
        let transfer_logic = Credential::from_data(transfer)
            .map_err(|e| RegistryError::MalformedNode(format!("transfer logic: {e}")))?;
        let issuer_logic = Credential::from_data(issuer)
            .map_err(|e| RegistryError::MalformedNode(format!("issuer logic: {e}")))?;
        Ok(DirectoryNode { key, next, transfer_logic, issuer_logic })
    }

    /// Serialize the datum to CBOR.
    pub fn encode(&self) -> Vec<u8> {
        self.to_data().to_cbor()
    }

    /// Deserialize a datum from CBOR.
    pub fn decode(bytes: &[u8]) -> Result<Self, RegistryError> {
        let data = PlutusData::from_cbor(bytes)
            .map_err(|e| RegistryError::MalformedNode(format!("datum CBOR: {e}")))?;
        Self::from_data(&data)
    }

    /// Decode the node held by a directory output's inline datum.
    pub fn from_output(output: &Output) -> Result<Self, RegistryError> {
        let datum = output
            .inline_datum()
            .ok_or_else(|| RegistryError::MalformedNode("output has no inline datum".into()))?;
        Self::from_data(datum)
    }
}

fn decode_key(data: &PlutusData, field: &str) -> Result<DirectoryKey, RegistryError> {
    let bytes = data
        .as_bytes()
        .ok_or_else(|| RegistryError::MalformedNode(format!("{field} is not a byte string")))?;
    if bytes.len() > MAX_ASSET_NAME_LEN {
        return Err(RegistryError::MalformedNode(format!(
            "{field} is {} bytes long",
            bytes.len()
        )));
    }
    Ok(DirectoryKey::new(bytes.to_vec()))
}

impl AsRef<DirectoryNode> for DirectoryNode {
    fn as_ref(&self) -> &DirectoryNode {
        self
    }
}

/// A directory node together with the output that stores it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// The node output.
    pub utxo: Utxo,
    /// The decoded node.
    pub node: DirectoryNode,
}

impl DirectoryEntry {
    /// Decode the node stored in `utxo`.
    pub fn from_utxo(utxo: Utxo) -> Result<Self, RegistryError> {
        let node = DirectoryNode::from_output(&utxo.output)?;
        Ok(DirectoryEntry { utxo, node })
    }
}

impl AsRef<DirectoryNode> for DirectoryEntry {
    fn as_ref(&self) -> &DirectoryNode {
        &self.node
    }
}

/// A snapshot of the directory: every node output, addressed by key.
#[derive(Clone, Debug, Default)]
pub struct Directory {
    /// Sorted by node key, keys unique.
    entries: Vec<DirectoryEntry>,
}

impl Directory {
    /// Build a snapshot from the outputs at the directory address.
    ///
    /// Outputs that hold no token of `directory_policy` are ignored. Every
    /// other output must hold a well-formed node whose NFT is named by the
    /// node key.
    ///
    /// # Errors
    /// [`RegistryError::MalformedNode`] for undecodable nodes or mismatched
    /// NFTs, [`RegistryError::BrokenChain`] if two outputs share a key.
    pub fn from_outputs(
        directory_policy: &PolicyId,
        utxos: impl IntoIterator<Item = Utxo>,
    ) -> Result<Self, RegistryError> {
        let mut entries = Vec::new();
        for utxo in utxos {
            let holds_node_token = utxo
                .output
                .assets
                .iter()
                .any(|(unit, _)| unit.policy() == Some(directory_policy));
            if !holds_node_token {
                continue;
            }
            let entry = DirectoryEntry::from_utxo(utxo)?;
            let expected = node_unit(directory_policy, &entry.node.key)?;
            if entry.utxo.output.assets.get(&expected) != 1 {
                return Err(RegistryError::MalformedNode(format!(
                    "output {} does not hold the NFT for key {}",
                    entry.utxo.out_ref, entry.node.key
                )));
            }
            entries.push(entry);
        }
        Self::from_entries(entries)
    }

    /// Build a snapshot from already decoded entries.
    pub fn from_entries(mut entries: Vec<DirectoryEntry>) -> Result<Self, RegistryError> {
        entries.sort_by(|a, b| a.node.key.cmp(&b.node.key));
        if let Some(pair) = entries.windows(2).find(|w| w[0].node.key == w[1].node.key) {
            return Err(RegistryError::BrokenChain(format!(
                "outputs {} and {} share key {}",
                pair[0].utxo.out_ref, pair[1].utxo.out_ref, pair[0].node.key
            )));
        }
        Ok(Directory { entries })
    }

    /// All entries in key order.
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Look up the entry for `key`.
    pub fn get(&self, key: &DirectoryKey) -> Option<&DirectoryEntry> {
        self.entries
            .binary_search_by(|e| e.node.key.cmp(key))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Returns `true` if a node exists for `key`.
    pub fn contains(&self, key: &DirectoryKey) -> bool {
        self.get(key).is_some()
    }

    /// Number of nodes, HEAD included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the snapshot holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check the chain invariant over the whole snapshot.
    pub fn validate(&self) -> Result<(), RegistryError> {
        validate_chain(self.entries.iter().map(|e| &e.node))
    }
}

/// Walk from HEAD following `next` and check the chain invariant.
///
/// The walk must visit strictly increasing keys, end at TAIL, and reach
/// every node exactly once.
///
/// # Errors
/// [`RegistryError::BrokenChain`] describing the first violation.
pub fn validate_chain<'a>(
    nodes: impl IntoIterator<Item = &'a DirectoryNode>,
) -> Result<(), RegistryError> {
    let mut by_key: BTreeMap<&DirectoryKey, &DirectoryNode> = BTreeMap::new();
    for node in nodes {
        if by_key.insert(&node.key, node).is_some() {
            return Err(RegistryError::BrokenChain(format!("duplicate node key {}", node.key)));
        }
    }

    let head = DirectoryKey::head();
    let mut cursor = &head;
    let mut visited = 0usize;
    loop {
        let node = by_key
            .get(cursor)
            .ok_or_else(|| RegistryError::BrokenChain(format!("no node for key {cursor}")))?;
        visited += 1;
        if node.next <= node.key {
            return Err(RegistryError::BrokenChain(format!(
                "node {} points backwards to {}",
                node.key, node.next
            )));
        }
        if node.next.is_tail() {
            break;
        }
        cursor = &node.next;
    }

    if visited != by_key.len() {
        return Err(RegistryError::BrokenChain(format!(
            "{} nodes are not reachable from HEAD",
            by_key.len() - visited
        )));
    }
    Ok(())
}
