//! Domain models for the Poker Night backend.
//!
//! Each model maps a database row. Status columns are stored as TEXT and
//! exposed through typed enums.

pub mod auth_session;
pub mod game_session;
pub mod player_session;
pub mod settlement;
pub mod transaction;
pub mod user;

// Re-export all models for convenient access
pub use auth_session::{AuthSession, PasswordResetToken};
pub use game_session::{GameSession, SessionStatus};
pub use player_session::{PlayerSession, PlayerStatus, PlayerWithUser};
pub use settlement::{SessionSettlement, SettlementTotals};
pub use transaction::{Transaction, TransactionType};
pub use user::{User, UserRole, UserSummary};
