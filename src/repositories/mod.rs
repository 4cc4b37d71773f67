pub mod auth_repository;
pub mod game_session_repository;
pub mod player_session_repository;
pub mod settlement_repository;
pub mod transaction_repository;
pub mod user_repository;

// Re-export all repositories for convenient access
pub use auth_repository::AuthRepository;
pub use game_session_repository::GameSessionRepository;
pub use player_session_repository::{LedgerEntry, PlayerSessionRepository};
pub use settlement_repository::SettlementRepository;
pub use transaction_repository::TransactionRepository;
pub use user_repository::UserRepository;
