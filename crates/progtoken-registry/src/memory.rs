//! In-memory ledger for tests.

use std::sync::Mutex;

use progtoken_ledger::{Address, Utxo};
use progtoken_primitives::hash::blake2b_256;
use progtoken_primitives::{TxHash, Unit};

use crate::client::{ClientError, LedgerClient, SignedTx, Submitter};

/// A fixed set of unspent outputs that answers [`LedgerClient`] queries
/// and records submitted transactions.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    utxos: Vec<Utxo>,
    submitted: Mutex<Vec<SignedTx>>,
    unavailable: bool,
}

impl MemoryLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger holding `utxos`.
    pub fn with_utxos(utxos: impl IntoIterator<Item = Utxo>) -> Self {
        MemoryLedger { utxos: utxos.into_iter().collect(), ..Self::default() }
    }

    /// Add an output.
    pub fn insert(&mut self, utxo: Utxo) {
        self.utxos.push(utxo);
    }

    /// Make every query fail, as an unreachable indexer would.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Transactions submitted so far.
    pub fn submitted(&self) -> Vec<SignedTx> {
        self.submitted.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), ClientError> {
        if self.unavailable {
            return Err(ClientError::new("ledger unavailable"));
        }
        Ok(())
    }

    fn at<'a>(&'a self, address: &'a Address) -> impl Iterator<Item = &'a Utxo> + 'a {
        self.utxos.iter().filter(move |u| u.output.address == *address)
    }
}

impl LedgerClient for MemoryLedger {
    async fn outputs_at(&self, address: &Address) -> Result<Vec<Utxo>, ClientError> {
        self.check_available()?;
        Ok(self.at(address).cloned().collect())
    }

    async fn output_by_unit(&self, unit: &Unit) -> Result<Utxo, ClientError> {
        self.check_available()?;
        let mut holders = self.utxos.iter().filter(|u| u.output.assets.get(unit) > 0);
        match (holders.next(), holders.next()) {
            (Some(utxo), None) => Ok(utxo.clone()),
            (None, _) => Err(ClientError::new(format!("no output holds {unit}"))),
            (Some(_), Some(_)) => Err(ClientError::new(format!("several outputs hold {unit}"))),
        }
    }

    async fn outputs_at_with_unit(
        &self,
        address: &Address,
        unit: &Unit,
    ) -> Result<Vec<Utxo>, ClientError> {
        self.check_available()?;
        Ok(self.at(address).filter(|u| u.output.assets.get(unit) > 0).cloned().collect())
    }
}

impl Submitter for MemoryLedger {
    async fn submit(&self, tx: &SignedTx) -> Result<TxHash, ClientError> {
        self.check_available()?;
        let hash = TxHash::new(blake2b_256(&tx.cbor));
        self.submitted
            .lock()
            .map_err(|_| ClientError::new("submission log poisoned"))?
            .push(tx.clone());
        Ok(hash)
    }
}
