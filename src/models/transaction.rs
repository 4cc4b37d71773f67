use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Ledger entry kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    BuyIn,
    Rebuy,
    CashOut,
    Adjustment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BuyIn => "BUY_IN",
            Self::Rebuy => "REBUY",
            Self::CashOut => "CASH_OUT",
            Self::Adjustment => "ADJUSTMENT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "BUY_IN" => Some(Self::BuyIn),
            "REBUY" => Some(Self::Rebuy),
            "CASH_OUT" => Some(Self::CashOut),
            "ADJUSTMENT" => Some(Self::Adjustment),
            _ => None,
        }
    }
}

/// Ledger row recording one change to a player's stack
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub player_session_id: Uuid,
    pub game_session_id: Uuid,
    pub user_id: Uuid,
    pub transaction_type: String,
    pub amount: Decimal,
    pub stack_before: Decimal,
    pub stack_after: Decimal,
    pub recorded_by: Option<Uuid>,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Transaction {
    pub fn tx_type(&self) -> Option<TransactionType> {
        TransactionType::from_str(&self.transaction_type)
    }
}
