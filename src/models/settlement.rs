use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Saved settlement line for one participant of a completed session
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SessionSettlement {
    pub id: Uuid,
    pub game_session_id: Uuid,
    pub user_id: Uuid,
    pub total_buy_in: Decimal,
    pub total_cash_out: Decimal,
    pub profit_loss: Decimal,
    pub cost_share: Decimal,
    pub expenses_paid: Decimal,
    pub net_amount: Decimal,
    pub created_at: NaiveDateTime,
}

/// Lifetime totals across a user's saved settlements
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct SettlementTotals {
    pub sessions_settled: i64,
    pub total_buy_in: Decimal,
    pub total_cash_out: Decimal,
    pub net_amount: Decimal,
}
