use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Ongoing,
    Completed,
}

impl SessionStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_uppercase().as_str() {
            "ONGOING" => Ok(SessionStatus::Ongoing),
            "COMPLETED" => Ok(SessionStatus::Completed),
            _ => Err(format!("Invalid session status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Ongoing => "ONGOING",
            SessionStatus::Completed => "COMPLETED",
        }
    }
}

impl From<SessionStatus> for String {
    fn from(status: SessionStatus) -> Self {
        status.as_str().to_string()
    }
}

/// One poker game, hosted by a user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GameSession {
    pub id: Uuid,
    pub name: String,
    pub host_id: Uuid,
    pub buy_in: Decimal,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub status: String, // Stored as TEXT, use SessionStatus enum for type safety
    pub started_at: NaiveDateTime,
    pub ended_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl GameSession {
    /// Get status as an enum
    pub fn status_enum(&self) -> SessionStatus {
        SessionStatus::from_str(&self.status).unwrap_or(SessionStatus::Ongoing)
    }

    /// Check if the session still accepts ledger entries
    pub fn is_ongoing(&self) -> bool {
        self.status_enum() == SessionStatus::Ongoing
    }

    /// Check if the session has ended
    pub fn is_completed(&self) -> bool {
        self.status_enum() == SessionStatus::Completed
    }
}
