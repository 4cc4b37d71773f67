//! Money rules and settlement arithmetic for a finished game.
//!
//! Everything here is pure: callers load player totals from the database,
//! hand them over, and persist what comes back.

pub mod settlement;
pub mod transfers;

pub use settlement::{
    compute_settlement, Expense, LedgerError, LedgerResult, ParticipantTotals, SettlementLine,
    SettlementSummary,
};
pub use transfers::{compute_transfers, Transfer};

use rust_decimal::Decimal;

/// Largest single amount accepted for one ledger entry
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Check that an amount is a positive number of cents below `MAX_AMOUNT`
pub fn validate_amount(amount: Decimal, what: &str) -> Result<(), String> {
    if amount <= Decimal::ZERO {
        return Err(format!("{} must be greater than zero", what));
    }
    check_bounds(amount, what)
}

/// Like `validate_amount`, but zero is allowed (a busted player's stack)
pub fn validate_non_negative(amount: Decimal, what: &str) -> Result<(), String> {
    if amount < Decimal::ZERO {
        return Err(format!("{} cannot be negative", what));
    }
    check_bounds(amount, what)
}

fn check_bounds(amount: Decimal, what: &str) -> Result<(), String> {
    if amount.round_dp(2) != amount {
        return Err(format!("{} cannot have more than two decimal places", what));
    }
    if amount > MAX_AMOUNT {
        return Err(format!("{} cannot exceed {}", what, MAX_AMOUNT));
    }
    Ok(())
}
