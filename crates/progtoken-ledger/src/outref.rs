//! Output references.
//!
//! An `OutRef` names one output of one transaction. The ledger keeps
//! reference inputs as a set ordered by `(tx_hash, index)`, and scripts
//! address reference inputs by their position in that order, so the `Ord`
//! implementation here is part of the on-chain contract.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use progtoken_primitives::TxHash;

use crate::LedgerError;

/// A reference to a transaction output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutRef {
    /// Hash of the transaction that created the output.
    pub tx_hash: TxHash,
    /// Position of the output within that transaction.
    pub index: u32,
}

impl OutRef {
    /// Create a new output reference.
    pub fn new(tx_hash: TxHash, index: u32) -> Self {
        OutRef { tx_hash, index }
    }
}

/// Byte-lexicographic on `tx_hash`, then numeric on `index`.
impl Ord for OutRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tx_hash
            .as_bytes()
            .cmp(other.tx_hash.as_bytes())
            .then(self.index.cmp(&other.index))
    }
}

impl PartialOrd for OutRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for OutRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.tx_hash, self.index)
    }
}

/// Parse the `<tx_hash>#<index>` form.
impl FromStr for OutRef {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hash, index) = s
            .split_once('#')
            .ok_or_else(|| LedgerError::InvalidOutRef(s.to_string()))?;
        let index = index
            .parse::<u32>()
            .map_err(|_| LedgerError::InvalidOutRef(s.to_string()))?;
        Ok(OutRef::new(TxHash::from_hex(hash)?, index))
    }
}
