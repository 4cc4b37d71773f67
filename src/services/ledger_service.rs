use crate::auth;
use crate::error::{option_to_result, AppError, AppResult};
use crate::ledger;
use crate::models::{GameSession, PlayerSession, Transaction, User};
use crate::repositories::{
    GameSessionRepository, LedgerEntry, PlayerSessionRepository, TransactionRepository,
    UserRepository,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const MAX_NOTE_LEN: usize = 500;

/// Buy-ins, rebuys, cash-outs and stack corrections
pub struct LedgerService {
    session_repo: Arc<GameSessionRepository>,
    player_repo: Arc<PlayerSessionRepository>,
    transaction_repo: Arc<TransactionRepository>,
    user_repo: Arc<UserRepository>,
}

fn validate_note(note: Option<&str>) -> AppResult<Option<&str>> {
    match note.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) if n.chars().count() > MAX_NOTE_LEN => Err(AppError::Validation(format!(
            "Note must be at most {} characters",
            MAX_NOTE_LEN
        ))),
        other => Ok(other),
    }
}

impl LedgerService {
    pub fn new(
        session_repo: Arc<GameSessionRepository>,
        player_repo: Arc<PlayerSessionRepository>,
        transaction_repo: Arc<TransactionRepository>,
        user_repo: Arc<UserRepository>,
    ) -> Self {
        Self {
            session_repo,
            player_repo,
            transaction_repo,
            user_repo,
        }
    }

    async fn load_session(&self, session_id: Uuid) -> AppResult<GameSession> {
        option_to_result(
            self.session_repo.find_by_id(session_id).await?,
            "Session not found",
        )
    }

    /// Load a seat and make sure it belongs to the session in the path
    async fn load_player(&self, session_id: Uuid, player_id: Uuid) -> AppResult<(GameSession, PlayerSession)> {
        let session = self.load_session(session_id).await?;
        let player = self
            .player_repo
            .find_by_id(player_id)
            .await?
            .filter(|p| p.game_session_id == session_id)
            .ok_or_else(|| AppError::NotFound("Player not found in this session".to_string()))?;
        Ok((session, player))
    }

    /// Seat a player with an initial buy-in. Without `user_id` the caller
    /// joins themselves; seating someone else takes the host or an admin.
    pub async fn add_player(
        &self,
        actor: &User,
        session_id: Uuid,
        user_id: Option<Uuid>,
        buy_in: Option<Decimal>,
    ) -> AppResult<LedgerEntry> {
        let session = self.load_session(session_id).await?;
        let user_id = user_id.unwrap_or(actor.id);

        if user_id != actor.id {
            auth::require_session_manager(actor, &session)?;
            if self.user_repo.find_by_id(user_id).await?.is_none() {
                return Err(AppError::NotFound("User not found".to_string()));
            }
        }

        if !session.is_ongoing() {
            return Err(AppError::BusinessLogic("Session is already completed".to_string()));
        }

        let buy_in = buy_in.unwrap_or(session.buy_in);
        ledger::validate_amount(buy_in, "Buy-in").map_err(AppError::Validation)?;

        let entry = self
            .player_repo
            .join(session_id, user_id, buy_in, actor.id, Utc::now().naive_utc())
            .await?;

        info!(
            "User {} joined session {} with {} (recorded by {})",
            user_id, session_id, buy_in, actor.id
        );
        Ok(entry)
    }

    pub async fn rebuy(
        &self,
        actor: &User,
        session_id: Uuid,
        player_id: Uuid,
        amount: Decimal,
        note: Option<&str>,
    ) -> AppResult<LedgerEntry> {
        let (session, player) = self.load_player(session_id, player_id).await?;
        if !auth::can_act_for_player(actor, &session, player.user_id) {
            return Err(AppError::Forbidden(
                "Only the player, the host or an admin can record a rebuy".to_string(),
            ));
        }
        ledger::validate_amount(amount, "Rebuy amount").map_err(AppError::Validation)?;
        let note = validate_note(note)?;

        let entry = self.player_repo.rebuy(player_id, amount, actor.id, note).await?;

        info!(
            "Rebuy of {} for player {} in session {}, stack now {}",
            amount, player_id, session_id, entry.player.stack
        );
        Ok(entry)
    }

    /// Cash out part of the stack, or all of it when `amount` is omitted
    pub async fn cash_out(
        &self,
        actor: &User,
        session_id: Uuid,
        player_id: Uuid,
        amount: Option<Decimal>,
    ) -> AppResult<LedgerEntry> {
        let (session, player) = self.load_player(session_id, player_id).await?;
        if !auth::can_act_for_player(actor, &session, player.user_id) {
            return Err(AppError::Forbidden(
                "Only the player, the host or an admin can cash out".to_string(),
            ));
        }
        if let Some(amount) = amount {
            ledger::validate_amount(amount, "Cash-out amount").map_err(AppError::Validation)?;
        }

        let entry = self
            .player_repo
            .cash_out(player_id, amount, actor.id, Utc::now().naive_utc())
            .await?;

        info!(
            "Player {} cashed out {} in session {}, status {}",
            player_id, entry.transaction.amount, session_id, entry.player.status
        );
        Ok(entry)
    }

    /// Record the player's current chip count
    pub async fn adjust_stack(
        &self,
        actor: &User,
        session_id: Uuid,
        player_id: Uuid,
        new_stack: Decimal,
        note: Option<&str>,
    ) -> AppResult<LedgerEntry> {
        let (session, _player) = self.load_player(session_id, player_id).await?;
        auth::require_session_manager(actor, &session)?;
        ledger::validate_non_negative(new_stack, "Stack").map_err(AppError::Validation)?;
        let note = validate_note(note)?;

        let entry = self
            .player_repo
            .adjust_stack(player_id, new_stack, actor.id, note)
            .await?;

        info!(
            "Stack of player {} in session {} set to {} by {}",
            player_id, session_id, new_stack, actor.id
        );
        Ok(entry)
    }

    /// Ledger of a session, visible to its participants and managers
    pub async fn list_transactions(&self, actor: &User, session_id: Uuid) -> AppResult<Vec<Transaction>> {
        let session = self.load_session(session_id).await?;
        let is_participant = self
            .player_repo
            .find_by_session_and_user(session_id, actor.id)
            .await?
            .is_some();
        if !auth::can_view_session(actor, &session, is_participant) {
            return Err(AppError::NotFound("Session not found".to_string()));
        }

        Ok(self.transaction_repo.find_by_session(session_id).await?)
    }
}
