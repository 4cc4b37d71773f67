use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One payment that moves money from a net loser to a net winner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub amount: Decimal,
}

/// Greedy settle-up: the largest debtor pays the largest creditor until one
/// side is exhausted. Produces at most n-1 transfers. Positions smaller than
/// a cent are ignored. When the positions do not sum to zero only the
/// balanced portion is transferred.
pub fn compute_transfers(nets: &[(Uuid, Decimal)]) -> Vec<Transfer> {
    let one_cent = Decimal::new(1, 2);

    let mut creditors: Vec<(Uuid, Decimal)> = nets
        .iter()
        .filter(|(_, net)| *net >= one_cent)
        .copied()
        .collect();
    let mut debtors: Vec<(Uuid, Decimal)> = nets
        .iter()
        .filter(|(_, net)| *net <= -one_cent)
        .map(|(id, net)| (*id, -*net))
        .collect();

    // Largest first; ties broken by id so the result is deterministic
    creditors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    debtors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut transfers = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < debtors.len() && j < creditors.len() {
        let amount = debtors[i].1.min(creditors[j].1);
        transfers.push(Transfer {
            from_user_id: debtors[i].0,
            to_user_id: creditors[j].0,
            amount,
        });

        debtors[i].1 -= amount;
        creditors[j].1 -= amount;
        if debtors[i].1 < one_cent {
            i += 1;
        }
        if creditors[j].1 < one_cent {
            j += 1;
        }
    }

    transfers
}
