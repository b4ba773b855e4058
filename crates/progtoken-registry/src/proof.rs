//! Membership and non-membership proofs over the directory.

use std::collections::BTreeMap;

use progtoken_ledger::{OutRef, Utxo};
use progtoken_primitives::PolicyId;

use crate::directory::{DirectoryEntry, DirectoryKey, DirectoryNode};
use crate::error::RegistryError;
use crate::planner::find_insertion_point;

/// Which kind of evidence a proof exhibits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProofKind {
    /// The key's own directory node.
    Member,
    /// The node whose interval would contain the key.
    Absent,
}

/// Evidence about one policy, valid for one transaction plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofEntry {
    /// The policy being proven.
    pub key: PolicyId,
    /// Membership or non-membership.
    pub kind: ProofKind,
    /// The directory node output cited as a reference input.
    pub reference: Utxo,
}

impl ProofEntry {
    /// The reference input this proof cites.
    pub fn out_ref(&self) -> &OutRef {
        &self.reference.out_ref
    }

    /// Returns `true` for membership proofs.
    pub fn is_member(&self) -> bool {
        self.kind == ProofKind::Member
    }
}

/// Classify each key as registered or unregistered and attach its proof.
///
/// Keys with an entry in `registered` get a membership proof citing that
/// output directly; the insertion planner is never consulted for them.
/// Every other key gets a non-membership proof citing the node of `nodes`
/// whose interval contains it. The result follows the order of `keys`.
///
/// # Arguments
/// * `keys` - Policies to prove, in the caller's order.
/// * `registered` - Directory node output of every key the caller knows to be registered.
/// * `nodes` - Directory snapshot used for non-membership proofs.
///
/// # Errors
/// * [`RegistryError::AmbiguousProof`] if a membership reference holds the
///   node of a different key, or if a key treated as unregistered has a
///   node in the snapshot.
/// * [`RegistryError::MalformedNode`] if a membership reference does not
///   hold a directory node.
/// * Any error of [`find_insertion_point`].
pub fn classify(
    keys: &[PolicyId],
    registered: &BTreeMap<PolicyId, Utxo>,
    nodes: &[DirectoryEntry],
) -> Result<Vec<ProofEntry>, RegistryError> {
    keys.iter()
        .map(|key| {
            let dir_key = DirectoryKey::from(*key);
            match registered.get(key) {
                Some(reference) => {
                    let node = DirectoryNode::from_output(&reference.output)?;
                    if node.key != dir_key {
                        return Err(RegistryError::AmbiguousProof(*key));
                    }
                    Ok(ProofEntry { key: *key, kind: ProofKind::Member, reference: reference.clone() })
                }
                None => {
                    if nodes.iter().any(|e| e.node.key == dir_key) {
                        return Err(RegistryError::AmbiguousProof(*key));
                    }
                    let covering = find_insertion_point(&dir_key, nodes)?;
                    Ok(ProofEntry {
                        key: *key,
                        kind: ProofKind::Absent,
                        reference: covering.utxo.clone(),
                    })
                }
            }
        })
        .collect()
}
