use crate::auth;
use crate::error::{option_to_result, AppError, AppResult};
use crate::ledger;
use crate::models::{GameSession, PlayerWithUser, Transaction, User};
use crate::repositories::{GameSessionRepository, PlayerSessionRepository, TransactionRepository};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const MAX_SESSION_NAME_LEN: usize = 120;
const ADMIN_PAGE_SIZE: i64 = 200;

/// Input for a new game session
#[derive(Debug, Clone)]
pub struct NewGameSession {
    pub name: String,
    pub buy_in: Decimal,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Running money totals across every seat of a session
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionTotals {
    pub players: usize,
    pub active_players: usize,
    pub total_buy_in: Decimal,
    pub total_cash_out: Decimal,
    /// Chips still on the table
    pub chips_in_play: Decimal,
}

impl SessionTotals {
    pub fn from_players(players: &[PlayerWithUser]) -> Self {
        players.iter().fold(Self::default(), |mut totals, p| {
            totals.players += 1;
            if p.is_active() {
                totals.active_players += 1;
            }
            totals.total_buy_in += p.total_buy_in;
            totals.total_cash_out += p.total_cash_out;
            totals.chips_in_play += p.stack;
            totals
        })
    }
}

/// A session with everything needed to render it
#[derive(Debug, Clone, Serialize)]
pub struct SessionDetail {
    pub session: GameSession,
    pub players: Vec<PlayerWithUser>,
    pub transactions: Vec<Transaction>,
    pub totals: SessionTotals,
    /// Whether the caller may run host actions
    pub can_manage: bool,
}

/// Lifecycle of game sessions
pub struct GameSessionService {
    session_repo: Arc<GameSessionRepository>,
    player_repo: Arc<PlayerSessionRepository>,
    transaction_repo: Arc<TransactionRepository>,
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl GameSessionService {
    pub fn new(
        session_repo: Arc<GameSessionRepository>,
        player_repo: Arc<PlayerSessionRepository>,
        transaction_repo: Arc<TransactionRepository>,
    ) -> Self {
        Self {
            session_repo,
            player_repo,
            transaction_repo,
        }
    }

    /// Load a session or fail with 404
    pub async fn load(&self, session_id: Uuid) -> AppResult<GameSession> {
        option_to_result(
            self.session_repo.find_by_id(session_id).await?,
            "Session not found",
        )
    }

    /// Start a new session hosted by `host`
    pub async fn create_session(&self, host: &User, input: NewGameSession) -> AppResult<GameSession> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Session name is required".to_string()));
        }
        if name.chars().count() > MAX_SESSION_NAME_LEN {
            return Err(AppError::Validation(format!(
                "Session name must be at most {} characters",
                MAX_SESSION_NAME_LEN
            )));
        }
        ledger::validate_amount(input.buy_in, "Buy-in").map_err(AppError::Validation)?;

        let session = self
            .session_repo
            .create(
                host.id,
                name,
                input.buy_in,
                clean_optional(input.location).as_deref(),
                clean_optional(input.notes).as_deref(),
            )
            .await?;

        info!(
            "Created session {} ({}) hosted by {}, buy-in {}",
            session.id, session.name, host.id, session.buy_in
        );
        Ok(session)
    }

    /// Sessions the caller hosts or plays in. `all` lists every session and
    /// is reserved for admins.
    pub async fn list_sessions(&self, actor: &User, all: bool) -> AppResult<Vec<GameSession>> {
        if all {
            auth::require_admin(actor)?;
            return Ok(self.session_repo.list_all(ADMIN_PAGE_SIZE, 0).await?);
        }
        Ok(self.session_repo.list_for_user(actor.id).await?)
    }

    pub async fn get_session_detail(&self, actor: &User, session_id: Uuid) -> AppResult<SessionDetail> {
        let session = self.load(session_id).await?;
        let players = self.player_repo.find_by_session(session_id).await?;

        let is_participant = players.iter().any(|p| p.user_id == actor.id);
        if !auth::can_view_session(actor, &session, is_participant) {
            // Hide the existence of sessions the caller has no part in
            return Err(AppError::NotFound("Session not found".to_string()));
        }

        let transactions = self.transaction_repo.find_by_session(session_id).await?;
        let totals = SessionTotals::from_players(&players);
        let can_manage = auth::can_manage_session(actor, &session);

        Ok(SessionDetail {
            session,
            players,
            transactions,
            totals,
            can_manage,
        })
    }

    /// End a session. Rejected while anyone is still seated.
    pub async fn complete_session(&self, actor: &User, session_id: Uuid) -> AppResult<GameSession> {
        let session = self.load(session_id).await?;
        auth::require_session_manager(actor, &session)?;

        let completed = self
            .session_repo
            .complete(session_id, Utc::now().naive_utc())
            .await?;

        info!("Session {} completed by {}", completed.id, actor.id);
        Ok(completed)
    }

    pub async fn delete_session(&self, actor: &User, session_id: Uuid) -> AppResult<()> {
        let session = self.load(session_id).await?;
        auth::require_session_manager(actor, &session)?;

        if !self.session_repo.delete(session_id).await? {
            return Err(AppError::NotFound("Session not found".to_string()));
        }

        info!("Session {} deleted by {}", session_id, actor.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn player(stack: i64, buy_in: i64, cash_out: i64, status: &str) -> PlayerWithUser {
        PlayerWithUser {
            id: Uuid::new_v4(),
            game_session_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            user_name: "P".to_string(),
            user_email: "p@example.com".to_string(),
            status: status.to_string(),
            stack: Decimal::from(stack),
            total_buy_in: Decimal::from(buy_in),
            total_cash_out: Decimal::from(cash_out),
            joined_at: Utc::now().naive_utc(),
            cashed_out_at: None,
        }
    }

    #[test]
    fn test_session_totals() {
        let players = vec![
            player(35, 20, 0, "ACTIVE"),
            player(0, 40, 25, "CASHED_OUT"),
        ];
        let totals = SessionTotals::from_players(&players);
        assert_eq!(totals.players, 2);
        assert_eq!(totals.active_players, 1);
        assert_eq!(totals.total_buy_in, Decimal::from(60));
        assert_eq!(totals.total_cash_out, Decimal::from(25));
        assert_eq!(totals.chips_in_play, Decimal::from(35));
    }

    #[test]
    fn test_clean_optional() {
        assert_eq!(clean_optional(Some("  ".to_string())), None);
        assert_eq!(clean_optional(Some(" Bob's ".to_string())), Some("Bob's".to_string()));
        assert_eq!(clean_optional(None), None);
    }
}
