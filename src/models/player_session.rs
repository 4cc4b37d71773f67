use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Whether a player is still seated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerStatus {
    Active,
    CashedOut,
}

impl PlayerStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Ok(PlayerStatus::Active),
            "CASHED_OUT" => Ok(PlayerStatus::CashedOut),
            _ => Err(format!("Invalid player status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerStatus::Active => "ACTIVE",
            PlayerStatus::CashedOut => "CASHED_OUT",
        }
    }
}

/// A participant's seat and running stack within a game session
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlayerSession {
    pub id: Uuid,
    pub game_session_id: Uuid,
    pub user_id: Uuid,
    pub status: String, // Stored as TEXT, use PlayerStatus enum for type safety
    pub stack: Decimal,
    pub total_buy_in: Decimal,
    pub total_cash_out: Decimal,
    pub joined_at: NaiveDateTime,
    pub cashed_out_at: Option<NaiveDateTime>,
}

impl PlayerSession {
    /// Get status as an enum
    pub fn status_enum(&self) -> PlayerStatus {
        PlayerStatus::from_str(&self.status).unwrap_or(PlayerStatus::Active)
    }

    pub fn is_active(&self) -> bool {
        self.status_enum() == PlayerStatus::Active
    }

    /// Cash out minus buy-in so far
    pub fn profit_loss(&self) -> Decimal {
        self.total_cash_out - self.total_buy_in
    }
}

/// Player row joined with the user's display fields
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlayerWithUser {
    pub id: Uuid,
    pub game_session_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub status: String,
    pub stack: Decimal,
    pub total_buy_in: Decimal,
    pub total_cash_out: Decimal,
    pub joined_at: NaiveDateTime,
    pub cashed_out_at: Option<NaiveDateTime>,
}

impl PlayerWithUser {
    pub fn is_active(&self) -> bool {
        PlayerStatus::from_str(&self.status).unwrap_or(PlayerStatus::Active)
            == PlayerStatus::Active
    }
}
