//! The deterministic ordering of a transaction's reference inputs.
//!
//! On-chain validators see reference inputs sorted by `(tx_hash, index)`
//! and address them by position. Every redeemer index produced off-chain
//! is a position in this ordering, so the sort is part of the wire
//! contract: byte-lexicographic on the transaction hash, then ascending
//! on the output index.

use progtoken_ledger::{OutRef, Utxo};

/// Reference inputs in ledger order, without duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortedReferenceSet {
    utxos: Vec<Utxo>,
}

impl SortedReferenceSet {
    /// Position of `out_ref` in the set.
    pub fn index_of(&self, out_ref: &OutRef) -> Option<usize> {
        self.utxos.binary_search_by(|u| u.out_ref.cmp(out_ref)).ok()
    }

    /// The reference at `index`.
    pub fn get(&self, index: usize) -> Option<&Utxo> {
        self.utxos.get(index)
    }

    /// Returns `true` if `out_ref` is part of the set.
    pub fn contains(&self, out_ref: &OutRef) -> bool {
        self.index_of(out_ref).is_some()
    }

    /// Iterate in ledger order.
    pub fn iter(&self) -> impl Iterator<Item = &Utxo> {
        self.utxos.iter()
    }

    /// The output references in ledger order.
    pub fn out_refs(&self) -> Vec<OutRef> {
        self.utxos.iter().map(|u| u.out_ref).collect()
    }

    /// Number of distinct references.
    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }
}

impl IntoIterator for SortedReferenceSet {
    type Item = Utxo;
    type IntoIter = std::vec::IntoIter<Utxo>;

    fn into_iter(self) -> Self::IntoIter {
        self.utxos.into_iter()
    }
}

/// Sort and de-duplicate a collection of reference inputs.
///
/// Two entries with the same [`OutRef`] collapse into one, so two proofs
/// backed by the same directory node share an index. The result depends
/// only on the set of references, never on the order they were supplied.
pub fn build_sorted_reference_set(references: impl IntoIterator<Item = Utxo>) -> SortedReferenceSet {
    let mut utxos: Vec<Utxo> = references.into_iter().collect();
    utxos.sort_by(|a, b| a.out_ref.cmp(&b.out_ref));
    utxos.dedup_by(|a, b| a.out_ref == b.out_ref);
    SortedReferenceSet { utxos }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progtoken_ledger::{Address, Assets, Output};
    use progtoken_primitives::TxHash;

    fn utxo(hash_hex: &str, index: u32) -> Utxo {
        Utxo::new(
            OutRef::new(TxHash::from_hex(hash_hex).unwrap(), index),
            Output::new(Address::new("addr_test1_ref"), Assets::from_lovelace(1)),
        )
    }

    fn h(byte: &str) -> String {
        byte.repeat(32)
    }

    #[test]
    fn sorts_by_hash_then_index() {
        let set = build_sorted_reference_set(vec![
            utxo(&h("bb"), 0),
            utxo(&h("aa"), 7),
            utxo(&h("aa"), 2),
            utxo(&h("0f"), 9),
        ]);
        let order: Vec<(String, u32)> =
            set.iter().map(|u| (u.out_ref.tx_hash.to_hex(), u.out_ref.index)).collect();
        assert_eq!(
            order,
            vec![(h("0f"), 9), (h("aa"), 2), (h("aa"), 7), (h("bb"), 0)]
        );
    }

    #[test]
    fn index_is_numeric_not_textual() {
        let set = build_sorted_reference_set(vec![utxo(&h("aa"), 10), utxo(&h("aa"), 9)]);
        assert_eq!(set.get(0).unwrap().out_ref.index, 9);
        assert_eq!(set.get(1).unwrap().out_ref.index, 10);
    }

    #[test]
    fn duplicates_collapse() {
        let set = build_sorted_reference_set(vec![
            utxo(&h("aa"), 1),
            utxo(&h("aa"), 1),
            utxo(&h("bb"), 0),
        ]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.index_of(&OutRef::new(TxHash::from_hex(&h("bb")).unwrap(), 0)), Some(1));
    }

    #[test]
    fn lookups_on_missing_refs() {
        let set = build_sorted_reference_set(vec![utxo(&h("aa"), 1)]);
        let missing = OutRef::new(TxHash::from_hex(&h("aa")).unwrap(), 2);
        assert!(!set.contains(&missing));
        assert_eq!(set.index_of(&missing), None);
        assert!(set.get(3).is_none());
        assert!(build_sorted_reference_set(Vec::new()).is_empty());
    }
}
