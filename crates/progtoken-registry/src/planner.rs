//! Insertion-point search over a directory snapshot.

use progtoken_ledger::Credential;

use crate::directory::{DirectoryEntry, DirectoryKey, DirectoryNode};
use crate::error::RegistryError;

/// Find the unique node whose `(key, next)` interval contains `target`.
///
/// The scan is linear and order-independent: `nodes` may be supplied in
/// any order. After the covering node `N` is found, the snapshot is also
/// checked for a node whose key lies strictly between `N.key` and
/// `N.next`; such a node means `N` is stale and its interval no longer
/// proves absence.
///
/// # Arguments
/// * `target` - Key to place.
/// * `nodes` - Directory snapshot (nodes or entries).
///
/// # Returns
/// The covering node, borrowed from `nodes`.
///
/// # Errors
/// * [`RegistryError::DuplicateKey`] if `target` already has a node.
/// * [`RegistryError::NoInsertionPoint`] if no node covers `target`.
/// * [`RegistryError::BrokenChain`] if several nodes cover `target` or
///   the covering interval is not adjacent.
pub fn find_insertion_point<'a, N: AsRef<DirectoryNode>>(
    target: &DirectoryKey,
    nodes: &'a [N],
) -> Result<&'a N, RegistryError> {
    if nodes.iter().any(|n| n.as_ref().key == *target) {
        return Err(RegistryError::DuplicateKey(target.clone()));
    }

    let mut covering = nodes.iter().filter(|n| n.as_ref().covers(target));
    let found = covering
        .next()
        .ok_or_else(|| RegistryError::NoInsertionPoint(target.clone()))?;
    if let Some(other) = covering.next() {
        return Err(RegistryError::BrokenChain(format!(
            "key {target} is covered by both {} and {}",
            found.as_ref().key,
            other.as_ref().key
        )));
    }

    let node = found.as_ref();
    if let Some(inside) = nodes.iter().map(|n| n.as_ref()).find(|n| node.covers(&n.key)) {
        return Err(RegistryError::BrokenChain(format!(
            "node {} lies inside the interval ({}, {})",
            inside.key, node.key, node.next
        )));
    }

    Ok(found)
}

/// The two-node update that inserts a key into the directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsertionPlan {
    /// The covering node, consumed by the transaction.
    pub predecessor: DirectoryEntry,
    /// The predecessor re-created with `next` set to the new key.
    pub updated: DirectoryNode,
    /// The new node, linking to the predecessor's old successor.
    pub inserted: DirectoryNode,
}

impl InsertionPlan {
    /// Apply the update to a node list and return the new snapshot in key order.
    pub fn apply(&self, nodes: &[DirectoryNode]) -> Vec<DirectoryNode> {
        let mut out: Vec<DirectoryNode> = nodes
            .iter()
            .map(|n| {
                if n.key == self.updated.key {
                    self.updated.clone()
                } else {
                    n.clone()
                }
            })
            .collect();
        out.push(self.inserted.clone());
        out.sort_by(|a, b| a.key.cmp(&b.key));
        out
    }
}

/// Plan the insertion of `target` with the given logic credentials.
pub fn plan_insertion(
    target: &DirectoryKey,
    transfer_logic: Credential,
    issuer_logic: Credential,
    entries: &[DirectoryEntry],
) -> Result<InsertionPlan, RegistryError> {
    let predecessor = find_insertion_point(target, entries)?;
    let inserted = DirectoryNode {
        key: target.clone(),
        next: predecessor.node.next.clone(),
        transfer_logic,
        issuer_logic,
    };
    let updated = DirectoryNode { next: target.clone(), ..predecessor.node.clone() };
    Ok(InsertionPlan { predecessor: predecessor.clone(), updated, inserted })
}
