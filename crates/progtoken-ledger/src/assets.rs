//! Multi-asset bundles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use progtoken_primitives::{PolicyId, Unit};

use crate::LedgerError;

/// A bundle of asset quantities keyed by unit.
///
/// Zero quantities are never stored, so two bundles holding the same
/// non-zero quantities compare equal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assets(BTreeMap<Unit, u64>);

impl Assets {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Assets(BTreeMap::new())
    }

    /// A bundle holding only the native coin.
    pub fn from_lovelace(quantity: u64) -> Self {
        Assets::new().with(Unit::Lovelace, quantity)
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, unit: Unit, quantity: u64) -> Self {
        self.insert(unit, quantity);
        self
    }

    /// Set the quantity of `unit`, removing it when `quantity` is zero.
    pub fn insert(&mut self, unit: Unit, quantity: u64) {
        if quantity == 0 {
            self.0.remove(&unit);
        } else {
            self.0.insert(unit, quantity);
        }
    }

    /// Quantity held of `unit`.
    pub fn get(&self, unit: &Unit) -> u64 {
        self.0.get(unit).copied().unwrap_or(0)
    }

    /// Returns `true` if the bundle holds nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct units held.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over `(unit, quantity)` pairs in unit order.
    pub fn iter(&self) -> impl Iterator<Item = (&Unit, u64)> {
        self.0.iter().map(|(u, q)| (u, *q))
    }

    /// Add every quantity of `other` to this bundle.
    pub fn checked_add(&self, other: &Assets) -> Result<Assets, LedgerError> {
        let mut sum = self.clone();
        for (unit, quantity) in other.iter() {
            let total = sum
                .get(unit)
                .checked_add(quantity)
                .ok_or_else(|| LedgerError::AmountOverflow(unit.to_string()))?;
            sum.insert(unit.clone(), total);
        }
        Ok(sum)
    }

    /// Subtract `other`, dropping units that would go to or below zero.
    pub fn saturating_sub(&self, other: &Assets) -> Assets {
        self.iter()
            .map(|(unit, quantity)| (unit.clone(), quantity.saturating_sub(other.get(unit))))
            .collect()
    }

    /// Returns `true` if every quantity in `other` is available here.
    pub fn covers(&self, other: &Assets) -> bool {
        self.shortfall(other).is_none()
    }

    /// The first unit of `other` this bundle cannot cover, as
    /// `(unit, needed, available)`.
    pub fn shortfall(&self, other: &Assets) -> Option<(Unit, u64, u64)> {
        other.iter().find_map(|(unit, needed)| {
            let available = self.get(unit);
            (available < needed).then(|| (unit.clone(), needed, available))
        })
    }

    /// Distinct token policies in the bundle, in unit order.
    pub fn policies(&self) -> Vec<PolicyId> {
        let mut policies: Vec<PolicyId> = Vec::new();
        for unit in self.0.keys() {
            if let Some(policy) = unit.policy() {
                if policies.last() != Some(policy) {
                    policies.push(*policy);
                }
            }
        }
        policies
    }
}

impl FromIterator<(Unit, u64)> for Assets {
    fn from_iter<I: IntoIterator<Item = (Unit, u64)>>(iter: I) -> Self {
        let mut assets = Assets::new();
        for (unit, quantity) in iter {
            assets.insert(unit, quantity);
        }
        assets
    }
}
