//! Redeemer payloads for the global logic script and per-policy transfer scripts.
//!
//! Wire shapes:
//!
//! ```text
//! global     = Constr 0 [ [ Constr 0 [idx] | Constr 1 [idx], ... ] ]   -- Member | Absent
//! per-policy = Constr 0 [ idx, param_1, ..., param_n ]
//! ```
//!
//! Every `idx` is a position in the transaction's [`SortedReferenceSet`].

use std::fmt;
use std::sync::Arc;

use progtoken_ledger::Utxo;
use progtoken_primitives::{PlutusData, PolicyId};

use crate::error::RegistryError;
use crate::proof::{ProofEntry, ProofKind};
use crate::reference_set::SortedReferenceSet;

/// An encoded script argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redeemer(PlutusData);

impl Redeemer {
    /// Wrap a data value.
    pub fn new(data: PlutusData) -> Self {
        Redeemer(data)
    }

    /// The unit redeemer `Constr(0, [])`.
    pub fn void() -> Self {
        Redeemer(PlutusData::void())
    }

    /// The underlying data value.
    pub fn data(&self) -> &PlutusData {
        &self.0
    }

    /// CBOR encoding.
    pub fn to_cbor(&self) -> Vec<u8> {
        self.0.to_cbor()
    }

    /// Hex of the CBOR encoding.
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl From<PlutusData> for Redeemer {
    fn from(data: PlutusData) -> Self {
        Redeemer(data)
    }
}

/// A tagged reference-input index inside the global redeemer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProofTag {
    /// The referenced node is the key's own node.
    Member(u64),
    /// The referenced node's interval contains the key.
    Absent(u64),
}

impl ProofTag {
    /// The reference-set index carried by the tag.
    pub fn index(&self) -> u64 {
        match self {
            ProofTag::Member(i) | ProofTag::Absent(i) => *i,
        }
    }

    /// Encode as `Constr(0, [idx])` or `Constr(1, [idx])`.
    pub fn to_data(&self) -> PlutusData {
        match self {
            ProofTag::Member(i) => PlutusData::constr(0, vec![PlutusData::integer(*i)]),
            ProofTag::Absent(i) => PlutusData::constr(1, vec![PlutusData::integer(*i)]),
        }
    }

    /// Decode from the constructor form.
    pub fn from_data(data: &PlutusData) -> Result<Self, RegistryError> {
        let malformed = || RegistryError::MalformedRedeemer(format!("bad proof tag {data:?}"));
        let (tag, fields) = data.as_constr().ok_or_else(malformed)?;
        let index = match fields {
            [field] => field.as_integer().ok_or_else(malformed)?,
            _ => return Err(malformed()),
        };
        let index = u64::try_from(index).map_err(|_| malformed())?;
        match tag {
            0 => Ok(ProofTag::Member(index)),
            1 => Ok(ProofTag::Absent(index)),
            _ => Err(malformed()),
        }
    }
}

fn index_data(index: usize) -> PlutusData {
    PlutusData::integer(index as u64)
}

/// Build the global logic redeemer.
///
/// Entries keep the order of `proofs`, which is the caller's key order;
/// only the indices come from `references`.
///
/// # Errors
/// [`RegistryError::MissingReference`] if a proof cites an output that is
/// not in `references`.
pub fn encode_global_redeemer(
    proofs: &[ProofEntry],
    references: &SortedReferenceSet,
) -> Result<Redeemer, RegistryError> {
    let tags = proofs
        .iter()
        .map(|proof| {
            let index = references
                .index_of(proof.out_ref())
                .ok_or(RegistryError::MissingReference(*proof.out_ref()))?
                as u64;
            let tag = match proof.kind {
                ProofKind::Member => ProofTag::Member(index),
                ProofKind::Absent => ProofTag::Absent(index),
            };
            Ok(tag.to_data())
        })
        .collect::<Result<Vec<_>, RegistryError>>()?;
    Ok(Redeemer(PlutusData::constr(0, vec![PlutusData::List(tags)])))
}

/// Decode a global logic redeemer back into its tagged indices.
pub fn decode_global_redeemer(redeemer: &Redeemer) -> Result<Vec<ProofTag>, RegistryError> {
    let malformed = || RegistryError::MalformedRedeemer("expected Constr 0 [list]".into());
    let (tag, fields) = redeemer.data().as_constr().ok_or_else(malformed)?;
    let list = match (tag, fields) {
        (0, [list]) => list.as_list().ok_or_else(malformed)?,
        _ => return Err(malformed()),
    };
    list.iter().map(ProofTag::from_data).collect()
}

/// Predicate that picks one reference input for a transfer script.
pub type SelectionCriteria = Arc<dyn Fn(&Utxo) -> bool + Send + Sync>;

/// How to authorize transfers of one registered policy: which reference
/// input the transfer script needs, and any extra redeemer parameters.
#[derive(Clone)]
pub struct TransferRule {
    selection: SelectionCriteria,
    params: Vec<PlutusData>,
}

impl TransferRule {
    /// A rule selecting the reference input accepted by `selection`.
    pub fn new(selection: impl Fn(&Utxo) -> bool + Send + Sync + 'static) -> Self {
        TransferRule { selection: Arc::new(selection), params: Vec::new() }
    }

    /// Append policy-specific redeemer parameters after the index.
    pub fn with_params(mut self, params: Vec<PlutusData>) -> Self {
        self.params = params;
        self
    }

    /// Returns `true` if `candidate` satisfies the rule.
    pub fn matches(&self, candidate: &Utxo) -> bool {
        (self.selection)(candidate)
    }

    /// Extra redeemer parameters.
    pub fn params(&self) -> &[PlutusData] {
        &self.params
    }
}

impl fmt::Debug for TransferRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferRule")
            .field("selection", &"<fn>")
            .field("params", &self.params)
            .finish()
    }
}

/// Build the redeemer for one policy's transfer script.
///
/// # Errors
/// [`RegistryError::NoMatchingReference`] unless exactly one reference in
/// `references` satisfies `rule`.
pub fn encode_per_policy_redeemer(
    policy: &PolicyId,
    references: &SortedReferenceSet,
    rule: &TransferRule,
) -> Result<Redeemer, RegistryError> {
    let matching: Vec<usize> = references
        .iter()
        .enumerate()
        .filter(|(_, utxo)| rule.matches(utxo))
        .map(|(i, _)| i)
        .collect();
    let [index] = matching[..] else {
        return Err(RegistryError::NoMatchingReference { policy: *policy, matches: matching.len() });
    };

    let mut fields = Vec::with_capacity(1 + rule.params.len());
    fields.push(index_data(index));
    fields.extend(rule.params.iter().cloned());
    Ok(Redeemer(PlutusData::constr(0, fields)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_set::build_sorted_reference_set;
    use progtoken_ledger::{Address, Assets, OutRef, Output};
    use progtoken_primitives::{Hash28, TxHash};

    fn utxo(hash: u8, index: u32) -> Utxo {
        Utxo::new(
            OutRef::new(TxHash::new([hash; 32]), index),
            Output::new(Address::new("addr_test1_ref"), Assets::from_lovelace(1)),
        )
    }

    fn proof(key: u8, kind: ProofKind, reference: Utxo) -> ProofEntry {
        ProofEntry { key: Hash28::new([key; 28]), kind, reference }
    }

    #[test]
    fn void_redeemer_bytes() {
        assert_eq!(Redeemer::void().to_hex(), "d87980");
    }

    #[test]
    fn global_redeemer_keeps_proof_order() {
        let high = utxo(0xf0, 0);
        let low = utxo(0x01, 0);
        let set = build_sorted_reference_set(vec![high.clone(), low.clone(), utxo(0x50, 0)]);
        let proofs = vec![proof(1, ProofKind::Member, high), proof(2, ProofKind::Absent, low)];

        let redeemer = encode_global_redeemer(&proofs, &set).unwrap();
        assert_eq!(
            decode_global_redeemer(&redeemer).unwrap(),
            vec![ProofTag::Member(2), ProofTag::Absent(0)]
        );
        // Constr 0 [ [ Constr 0 [2], Constr 1 [0] ] ]
        assert_eq!(redeemer.to_hex(), "d8799f9fd8799f02ffd87a9f00ffffff");
    }

    #[test]
    fn global_redeemer_for_empty_bundle() {
        let redeemer = encode_global_redeemer(&[], &SortedReferenceSet::default()).unwrap();
        assert_eq!(redeemer.to_hex(), "d8799f80ff");
        assert!(decode_global_redeemer(&redeemer).unwrap().is_empty());
    }

    #[test]
    fn proof_outside_reference_set_is_rejected() {
        let set = build_sorted_reference_set(vec![utxo(1, 0)]);
        let proofs = vec![proof(1, ProofKind::Member, utxo(2, 0))];
        assert!(matches!(
            encode_global_redeemer(&proofs, &set),
            Err(RegistryError::MissingReference(_))
        ));
    }

    #[test]
    fn decode_rejects_other_shapes() {
        assert!(decode_global_redeemer(&Redeemer::void()).is_err());
        let bad_tag = Redeemer::new(PlutusData::constr(
            0,
            vec![PlutusData::List(vec![PlutusData::constr(2, vec![PlutusData::integer(0)])])],
        ));
        assert!(matches!(
            decode_global_redeemer(&bad_tag),
            Err(RegistryError::MalformedRedeemer(_))
        ));
    }

    #[test]
    fn per_policy_redeemer_selects_single_reference() {
        let target = utxo(0x20, 4);
        let target_ref = target.out_ref;
        let set = build_sorted_reference_set(vec![utxo(0x10, 0), target, utxo(0x30, 0)]);
        let rule = TransferRule::new(move |u| u.out_ref == target_ref)
            .with_params(vec![PlutusData::bytes(vec![0xab])]);

        let redeemer = encode_per_policy_redeemer(&Hash28::new([9; 28]), &set, &rule).unwrap();
        assert_eq!(
            redeemer.data(),
            &PlutusData::constr(0, vec![PlutusData::integer(1u64), PlutusData::bytes(vec![0xab])])
        );
    }

    #[test]
    fn per_policy_redeemer_needs_exactly_one_match() {
        let set = build_sorted_reference_set(vec![utxo(0x10, 0), utxo(0x30, 0)]);
        let none = TransferRule::new(|_| false);
        let all = TransferRule::new(|_| true);
        let policy = Hash28::new([9; 28]);

        assert!(matches!(
            encode_per_policy_redeemer(&policy, &set, &none),
            Err(RegistryError::NoMatchingReference { matches: 0, .. })
        ));
        assert!(matches!(
            encode_per_policy_redeemer(&policy, &set, &all),
            Err(RegistryError::NoMatchingReference { matches: 2, .. })
        ));
    }
}
