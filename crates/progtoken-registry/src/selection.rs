//! Greedy coin selection over the sender's programmable outputs.

use progtoken_ledger::{Assets, Utxo};

use crate::error::RegistryError;

/// Outputs chosen to fund a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Outputs to spend, in selection order.
    pub inputs: Vec<Utxo>,
    /// Sum of the selected outputs.
    pub consumed: Assets,
    /// What remains after the request is paid.
    pub change: Assets,
}

/// How much of the request an output can pay.
fn contribution(utxo: &Utxo, request: &Assets) -> u128 {
    request
        .iter()
        .map(|(unit, needed)| u128::from(utxo.output.assets.get(unit).min(needed)))
        .sum()
}

/// Select outputs from `available` until `request` is covered.
///
/// Algorithm:
/// 1. Fail early if the request is empty or the total cannot cover it
/// 2. Order outputs by how much of the request they pay, largest first,
///    ties by output reference
/// 3. Skip outputs holding nothing requested
/// 4. Accumulate until every requested unit is covered
///
/// # Errors
/// * [`RegistryError::EmptyTransfer`] if `request` is empty.
/// * [`RegistryError::InsufficientFunds`] naming the first uncovered unit.
pub fn select_utxos(available: &[Utxo], request: &Assets) -> Result<Selection, RegistryError> {
    if request.is_empty() {
        return Err(RegistryError::EmptyTransfer);
    }

    let total = available
        .iter()
        .try_fold(Assets::new(), |acc, u| acc.checked_add(&u.output.assets))?;
    if let Some((unit, needed, available)) = total.shortfall(request) {
        return Err(RegistryError::InsufficientFunds { unit: unit.to_string(), needed, available });
    }

    let mut candidates: Vec<(u128, &Utxo)> =
        available.iter().map(|u| (contribution(u, request), u)).collect();
    candidates.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.out_ref.cmp(&b.1.out_ref)));

    let mut inputs = Vec::new();
    let mut consumed = Assets::new();
    for (weight, utxo) in candidates {
        if consumed.covers(request) {
            break;
        }
        if weight == 0 {
            continue;
        }
        consumed = consumed.checked_add(&utxo.output.assets)?;
        inputs.push(utxo.clone());
    }

    let change = consumed.saturating_sub(request);
    Ok(Selection { inputs, consumed, change })
}

#[cfg(test)]
mod tests {
    use super::*;
    use progtoken_ledger::{Address, OutRef, Output};
    use progtoken_primitives::{AssetName, Hash28, TxHash, Unit};

    fn token(b: u8) -> Unit {
        Unit::asset(Hash28::new([b; 28]), AssetName::from_text("TOK").unwrap())
    }

    fn utxo(index: u32, assets: Assets) -> Utxo {
        Utxo::new(
            OutRef::new(TxHash::new([5; 32]), index),
            Output::new(Address::new("addr_test1_sender"), assets),
        )
    }

    #[test]
    fn empty_request_is_rejected() {
        let available = vec![utxo(0, Assets::from_lovelace(10))];
        assert!(matches!(
            select_utxos(&available, &Assets::new()),
            Err(RegistryError::EmptyTransfer)
        ));
    }

    #[test]
    fn single_output_covers() {
        let available = vec![
            utxo(0, Assets::from_lovelace(2_000_000).with(token(1), 100)),
            utxo(1, Assets::from_lovelace(2_000_000)),
        ];
        let request = Assets::new().with(token(1), 40);
        let sel = select_utxos(&available, &request).unwrap();
        assert_eq!(sel.inputs.len(), 1);
        assert_eq!(sel.inputs[0].out_ref.index, 0);
        assert_eq!(sel.change.get(&token(1)), 60);
        assert_eq!(sel.change.get(&Unit::Lovelace), 2_000_000);
    }

    #[test]
    fn largest_contribution_first() {
        let available = vec![
            utxo(0, Assets::new().with(token(1), 10)),
            utxo(1, Assets::new().with(token(1), 50)),
            utxo(2, Assets::new().with(token(1), 30)),
        ];
        let request = Assets::new().with(token(1), 70);
        let sel = select_utxos(&available, &request).unwrap();
        let picked: Vec<u32> = sel.inputs.iter().map(|u| u.out_ref.index).collect();
        assert_eq!(picked, vec![1, 2]);
        assert_eq!(sel.change.get(&token(1)), 10);
    }

    #[test]
    fn multi_asset_request() {
        let available = vec![
            utxo(0, Assets::new().with(token(1), 10)),
            utxo(1, Assets::new().with(token(2), 10)),
            utxo(2, Assets::from_lovelace(99)),
        ];
        let request = Assets::new().with(token(1), 5).with(token(2), 10);
        let sel = select_utxos(&available, &request).unwrap();
        assert_eq!(sel.inputs.len(), 2);
        assert!(sel.consumed.covers(&request));
        assert!(sel.inputs.iter().all(|u| u.out_ref.index != 2));
    }

    #[test]
    fn insufficient_funds_names_the_unit() {
        let available = vec![utxo(0, Assets::new().with(token(1), 10))];
        let request = Assets::new().with(token(1), 11);
        match select_utxos(&available, &request) {
            Err(RegistryError::InsufficientFunds { unit, needed, available }) => {
                assert_eq!(unit, token(1).to_string());
                assert_eq!(needed, 11);
                assert_eq!(available, 10);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
