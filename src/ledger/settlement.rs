use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use super::transfers::{compute_transfers, Transfer};

/// Error types for settlement calculations
#[derive(Error, Debug, PartialEq)]
pub enum LedgerError {
    #[error("Settlement requires at least one participant")]
    NoParticipants,

    #[error("Invalid expense: {0}")]
    InvalidExpense(String),

    #[error("Expense payer {0} is not a participant")]
    UnknownPayer(Uuid),
}

/// Result type for settlement calculations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Buy-in and cash-out totals of one participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantTotals {
    pub user_id: Uuid,
    pub total_buy_in: Decimal,
    pub total_cash_out: Decimal,
}

/// Shared cost of the evening (food, table rental), split evenly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub description: String,
    pub amount: Decimal,
    /// Participant who fronted the money, credited back in the settlement
    #[serde(default)]
    pub paid_by: Option<Uuid>,
}

/// Computed result for one participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementLine {
    pub user_id: Uuid,
    pub total_buy_in: Decimal,
    pub total_cash_out: Decimal,
    pub profit_loss: Decimal,
    pub cost_share: Decimal,
    pub expenses_paid: Decimal,
    pub net_amount: Decimal,
}

/// Full settlement of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub lines: Vec<SettlementLine>,
    pub total_buy_in: Decimal,
    pub total_cash_out: Decimal,
    pub total_expenses: Decimal,
    /// Cash-outs minus buy-ins; non-zero when the chip count does not balance
    pub discrepancy: Decimal,
    pub transfers: Vec<Transfer>,
}

impl SettlementSummary {
    pub fn is_balanced(&self) -> bool {
        self.discrepancy.is_zero()
    }
}

fn cents(amount: Decimal) -> bool {
    amount.round_dp(2) == amount
}

/// Split `total` into `n` shares that differ by at most one cent and sum
/// exactly to `total`. Earlier positions receive the leftover cents.
pub(crate) fn split_evenly(total: Decimal, n: usize) -> Vec<Decimal> {
    if n == 0 {
        return Vec::new();
    }
    let count = Decimal::from(n as u64);
    let base = (total / count).round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let leftover = total - base * count;
    let extra_cents = (leftover * Decimal::ONE_HUNDRED).to_usize().unwrap_or(0);
    let one_cent = Decimal::new(1, 2);

    (0..n)
        .map(|i| if i < extra_cents { base + one_cent } else { base })
        .collect()
}

/// Compute each participant's profit/loss, cost share and net position.
///
/// Participants keep their input order in the result; that order also
/// decides who absorbs the leftover cents of an uneven cost split.
pub fn compute_settlement(
    participants: &[ParticipantTotals],
    expenses: &[Expense],
) -> LedgerResult<SettlementSummary> {
    if participants.is_empty() {
        return Err(LedgerError::NoParticipants);
    }

    let mut paid: HashMap<Uuid, Decimal> = HashMap::new();
    let mut total_expenses = Decimal::ZERO;
    for expense in expenses {
        if expense.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidExpense(format!(
                "'{}' must have a positive amount",
                expense.description
            )));
        }
        if !cents(expense.amount) {
            return Err(LedgerError::InvalidExpense(format!(
                "'{}' has more than two decimal places",
                expense.description
            )));
        }
        if let Some(payer) = expense.paid_by {
            if !participants.iter().any(|p| p.user_id == payer) {
                return Err(LedgerError::UnknownPayer(payer));
            }
            *paid.entry(payer).or_insert(Decimal::ZERO) += expense.amount;
        }
        total_expenses += expense.amount;
    }

    let shares = split_evenly(total_expenses, participants.len());

    let lines: Vec<SettlementLine> = participants
        .iter()
        .zip(shares)
        .map(|(p, cost_share)| {
            let profit_loss = p.total_cash_out - p.total_buy_in;
            let expenses_paid = paid.get(&p.user_id).copied().unwrap_or(Decimal::ZERO);
            SettlementLine {
                user_id: p.user_id,
                total_buy_in: p.total_buy_in,
                total_cash_out: p.total_cash_out,
                profit_loss,
                cost_share,
                expenses_paid,
                net_amount: profit_loss - cost_share + expenses_paid,
            }
        })
        .collect();

    let total_buy_in: Decimal = participants.iter().map(|p| p.total_buy_in).sum();
    let total_cash_out: Decimal = participants.iter().map(|p| p.total_cash_out).sum();

    let nets: Vec<(Uuid, Decimal)> = lines.iter().map(|l| (l.user_id, l.net_amount)).collect();
    let transfers = compute_transfers(&nets);

    Ok(SettlementSummary {
        lines,
        total_buy_in,
        total_cash_out,
        total_expenses,
        discrepancy: total_cash_out - total_buy_in,
        transfers,
    })
}
