//! Request and response bodies. Money travels as decimal strings and is
//! also accepted as a JSON number.

use crate::ledger::Expense;
use crate::models::{GameSession, User, UserRole};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub expires_at: NaiveDateTime,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub name: String,
    pub buy_in: Decimal,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListSessionsQuery {
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionsResponse {
    pub sessions: Vec<GameSession>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: GameSession,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddPlayerRequest {
    /// Defaults to the caller
    #[serde(default)]
    pub user_id: Option<Uuid>,
    /// Defaults to the session buy-in
    #[serde(default)]
    pub buy_in: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct RebuyRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CashOutRequest {
    /// Omit to cash out the whole stack
    #[serde(default)]
    pub amount: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct AdjustStackRequest {
    pub stack: Decimal,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SettlementRequest {
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_accepts_strings_and_numbers() {
        let from_str: RebuyRequest = serde_json::from_str(r#"{"amount": "20.50"}"#).unwrap();
        let from_num: RebuyRequest = serde_json::from_str(r#"{"amount": 20.5}"#).unwrap();
        assert_eq!(from_str.amount, from_num.amount);
        assert!(from_str.note.is_none());
    }

    #[test]
    fn test_optional_bodies_default() {
        let add: AddPlayerRequest = serde_json::from_str("{}").unwrap();
        assert!(add.user_id.is_none() && add.buy_in.is_none());

        let settle: SettlementRequest = serde_json::from_str("{}").unwrap();
        assert!(settle.expenses.is_empty());
    }

    #[test]
    fn test_role_parses_lowercase() {
        let req: SetRoleRequest = serde_json::from_str(r#"{"role": "admin"}"#).unwrap();
        assert_eq!(req.role, UserRole::Admin);
    }
}
