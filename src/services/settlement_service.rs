use crate::auth;
use crate::error::{option_to_result, AppError, AppResult};
use crate::ledger::{self, Expense, LedgerError, ParticipantTotals, SettlementSummary, Transfer};
use crate::models::{GameSession, SessionSettlement, User};
use crate::repositories::{GameSessionRepository, PlayerSessionRepository, SettlementRepository};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Saved settlement of a session plus the payments that settle it
#[derive(Debug, Clone, Serialize)]
pub struct SettlementView {
    pub game_session_id: Uuid,
    pub settlements: Vec<SessionSettlement>,
    pub transfers: Vec<Transfer>,
    pub total_expenses: Decimal,
    pub discrepancy: Decimal,
}

impl SettlementView {
    /// Rebuild the view from stored rows. Transfers are derived from the
    /// saved net amounts, so they always agree with the rows.
    pub fn from_rows(game_session_id: Uuid, settlements: Vec<SessionSettlement>) -> Self {
        let nets: Vec<(Uuid, Decimal)> = settlements
            .iter()
            .map(|s| (s.user_id, s.net_amount))
            .collect();
        let transfers = ledger::compute_transfers(&nets);

        let total_expenses = settlements.iter().map(|s| s.cost_share).sum();
        let discrepancy = settlements
            .iter()
            .map(|s| s.total_cash_out - s.total_buy_in)
            .sum();

        Self {
            game_session_id,
            settlements,
            transfers,
            total_expenses,
            discrepancy,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Settle-up of completed sessions
pub struct SettlementService {
    session_repo: Arc<GameSessionRepository>,
    player_repo: Arc<PlayerSessionRepository>,
    settlement_repo: Arc<SettlementRepository>,
}

impl SettlementService {
    pub fn new(
        session_repo: Arc<GameSessionRepository>,
        player_repo: Arc<PlayerSessionRepository>,
        settlement_repo: Arc<SettlementRepository>,
    ) -> Self {
        Self {
            session_repo,
            player_repo,
            settlement_repo,
        }
    }

    async fn load_session(&self, session_id: Uuid) -> AppResult<GameSession> {
        option_to_result(
            self.session_repo.find_by_id(session_id).await?,
            "Session not found",
        )
    }

    /// Participant totals in join order
    async fn participants(&self, session_id: Uuid) -> AppResult<Vec<ParticipantTotals>> {
        let players = self.player_repo.find_by_session(session_id).await?;
        Ok(players
            .into_iter()
            .map(|p| ParticipantTotals {
                user_id: p.user_id,
                total_buy_in: p.total_buy_in,
                total_cash_out: p.total_cash_out,
            })
            .collect())
    }

    /// Compute a settlement without saving it
    pub async fn preview(
        &self,
        actor: &User,
        session_id: Uuid,
        expenses: &[Expense],
    ) -> AppResult<SettlementSummary> {
        let session = self.load_session(session_id).await?;
        auth::require_session_manager(actor, &session)?;

        let participants = self.participants(session_id).await?;
        Ok(ledger::compute_settlement(&participants, expenses)?)
    }

    /// Compute and store the settlement, replacing any earlier one
    pub async fn save(
        &self,
        actor: &User,
        session_id: Uuid,
        expenses: &[Expense],
    ) -> AppResult<SettlementView> {
        let session = self.load_session(session_id).await?;
        auth::require_session_manager(actor, &session)?;

        if !session.is_completed() {
            return Err(AppError::BusinessLogic(
                "Session must be completed before it can be settled".to_string(),
            ));
        }

        let participants = self.participants(session_id).await?;
        let summary = ledger::compute_settlement(&participants, expenses)?;
        if !summary.is_balanced() {
            warn!(
                "Session {} settled with a discrepancy of {}",
                session_id, summary.discrepancy
            );
        }

        let settlements = self
            .settlement_repo
            .replace_for_session(session_id, &summary.lines)
            .await?;

        info!(
            "Saved settlement for session {}: {} participant(s), {} transfer(s)",
            session_id,
            settlements.len(),
            summary.transfers.len()
        );

        Ok(SettlementView {
            game_session_id: session_id,
            settlements,
            transfers: summary.transfers,
            total_expenses: summary.total_expenses,
            discrepancy: summary.discrepancy,
        })
    }

    /// The saved settlement; 404 when none has been saved yet
    pub async fn fetch(&self, actor: &User, session_id: Uuid) -> AppResult<SettlementView> {
        let session = self.load_session(session_id).await?;
        let is_participant = self
            .player_repo
            .find_by_session_and_user(session_id, actor.id)
            .await?
            .is_some();
        if !auth::can_view_session(actor, &session, is_participant) {
            return Err(AppError::NotFound("Session not found".to_string()));
        }

        let settlements = self.settlement_repo.find_by_session(session_id).await?;
        if settlements.is_empty() {
            return Err(AppError::NotFound(
                "Settlement has not been saved for this session".to_string(),
            ));
        }

        Ok(SettlementView::from_rows(session_id, settlements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(user_id: Uuid, buy_in: i64, cash_out: i64, cost_share: i64) -> SessionSettlement {
        let profit_loss = Decimal::from(cash_out - buy_in);
        SessionSettlement {
            id: Uuid::new_v4(),
            game_session_id: Uuid::nil(),
            user_id,
            total_buy_in: Decimal::from(buy_in),
            total_cash_out: Decimal::from(cash_out),
            profit_loss,
            cost_share: Decimal::from(cost_share),
            expenses_paid: Decimal::ZERO,
            net_amount: profit_loss - Decimal::from(cost_share),
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_view_from_rows() {
        let winner = Uuid::new_v4();
        let loser = Uuid::new_v4();
        let view = SettlementView::from_rows(
            Uuid::nil(),
            vec![row(winner, 20, 50, 5), row(loser, 40, 10, 5)],
        );

        assert_eq!(view.total_expenses, Decimal::from(10));
        assert_eq!(view.discrepancy, Decimal::ZERO);
        assert_eq!(view.transfers.len(), 1);
        assert_eq!(view.transfers[0].from_user_id, loser);
        assert_eq!(view.transfers[0].to_user_id, winner);
        assert_eq!(view.transfers[0].amount, Decimal::from(25));
    }

    #[test]
    fn test_ledger_errors_are_validation_errors() {
        let err: AppError = LedgerError::NoParticipants.into();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
