//! Transaction outputs and resolved UTxOs.

use std::fmt;

use serde::{Deserialize, Serialize};

use progtoken_primitives::PlutusData;

use crate::assets::Assets;
use crate::outref::OutRef;
use crate::script::Script;

/// A bech32 address.
///
/// Addresses are produced and interpreted by the external ledger tooling;
/// the core only compares and forwards them.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap a bech32 address string.
    pub fn new(address: impl Into<String>) -> Self {
        Address(address.into())
    }

    /// The address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Datum attached to an output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Datum {
    /// Only the Blake2b-256 hash of the datum is on chain.
    Hash(Vec<u8>),
    /// The datum itself is stored in the output.
    Inline(PlutusData),
}

/// A transaction output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Output {
    /// Address holding the output.
    pub address: Address,
    /// Value held.
    pub assets: Assets,
    /// Optional datum.
    pub datum: Option<Datum>,
    /// Optional reference script.
    pub script_ref: Option<Script>,
}

impl Output {
    /// An output with no datum or reference script.
    pub fn new(address: Address, assets: Assets) -> Self {
        Output { address, assets, datum: None, script_ref: None }
    }

    /// Attach an inline datum.
    pub fn with_inline_datum(mut self, datum: PlutusData) -> Self {
        self.datum = Some(Datum::Inline(datum));
        self
    }

    /// Attach a reference script.
    pub fn with_script_ref(mut self, script: Script) -> Self {
        self.script_ref = Some(script);
        self
    }

    /// The inline datum, if any.
    pub fn inline_datum(&self) -> Option<&PlutusData> {
        match &self.datum {
            Some(Datum::Inline(d)) => Some(d),
            _ => None,
        }
    }
}

/// An unspent output together with its reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Utxo {
    /// Where the output lives.
    pub out_ref: OutRef,
    /// The output itself.
    pub output: Output,
}

impl Utxo {
    /// Pair an output with its reference.
    pub fn new(out_ref: OutRef, output: Output) -> Self {
        Utxo { out_ref, output }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progtoken_primitives::TxHash;

    #[test]
    fn inline_datum_accessor() {
        let out = Output::new(Address::new("addr_test1xyz"), Assets::from_lovelace(2_000_000))
            .with_inline_datum(PlutusData::void());
        assert_eq!(out.inline_datum(), Some(&PlutusData::void()));

        let hashed = Output { datum: Some(Datum::Hash(vec![0; 32])), ..out };
        assert!(hashed.inline_datum().is_none());
    }

    #[test]
    fn utxo_pairs_reference() {
        let out_ref = OutRef::new(TxHash::new([1; 32]), 0);
        let utxo = Utxo::new(out_ref, Output::new(Address::new("addr1"), Assets::new()));
        assert_eq!(utxo.out_ref.index, 0);
        assert_eq!(utxo.output.address.as_str(), "addr1");
    }
}
