pub mod auth_service;
pub mod game_session_service;
pub mod ledger_service;
pub mod settlement_service;
pub mod user_service;

pub use auth_service::{AuthService, IssuedSession};
pub use game_session_service::{GameSessionService, NewGameSession, SessionDetail, SessionTotals};
pub use ledger_service::LedgerService;
pub use settlement_service::{SettlementService, SettlementView};
pub use user_service::{UserPage, UserService, UserStats};
