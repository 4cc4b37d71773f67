//! Saved settlements of completed sessions

use crate::error::RepositoryError;
use crate::ledger::SettlementLine;
use crate::models::{SessionSettlement, SettlementTotals};
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

const SETTLEMENT_COLUMNS: &str = "id, game_session_id, user_id, total_buy_in, total_cash_out, \
     profit_loss, cost_share, expenses_paid, net_amount, created_at";

pub struct SettlementRepository {
    pool: PgPool,
}

impl SettlementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Replace every settlement row of a session in one transaction
    pub async fn replace_for_session(
        &self,
        game_session_id: Uuid,
        lines: &[SettlementLine],
    ) -> Result<Vec<SessionSettlement>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent saves of the same session
        sqlx::query("SELECT id FROM game_sessions WHERE id = $1 FOR UPDATE")
            .bind(game_session_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Session not found".to_string()))?;

        sqlx::query("DELETE FROM session_settlements WHERE game_session_id = $1")
            .bind(game_session_id)
            .execute(&mut *tx)
            .await?;

        let mut saved = Vec::with_capacity(lines.len());
        for line in lines {
            let row = sqlx::query_as::<_, SessionSettlement>(&format!(
                r#"
                INSERT INTO session_settlements
                (game_session_id, user_id, total_buy_in, total_cash_out, profit_loss,
                 cost_share, expenses_paid, net_amount)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING {SETTLEMENT_COLUMNS}
                "#
            ))
            .bind(game_session_id)
            .bind(line.user_id)
            .bind(line.total_buy_in)
            .bind(line.total_cash_out)
            .bind(line.profit_loss)
            .bind(line.cost_share)
            .bind(line.expenses_paid)
            .bind(line.net_amount)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(row);
        }

        tx.commit().await?;

        Ok(saved)
    }

    pub async fn find_by_session(&self, game_session_id: Uuid) -> SqlxResult<Vec<SessionSettlement>> {
        sqlx::query_as::<_, SessionSettlement>(&format!(
            r#"
            SELECT {SETTLEMENT_COLUMNS}
            FROM session_settlements
            WHERE game_session_id = $1
            ORDER BY net_amount DESC, user_id ASC
            "#
        ))
        .bind(game_session_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Lifetime totals over a user's settled sessions
    pub async fn totals_for_user(&self, user_id: Uuid) -> SqlxResult<SettlementTotals> {
        sqlx::query_as::<_, SettlementTotals>(
            r#"
            SELECT COUNT(*) AS sessions_settled,
                   COALESCE(SUM(total_buy_in), 0) AS total_buy_in,
                   COALESCE(SUM(total_cash_out), 0) AS total_cash_out,
                   COALESCE(SUM(net_amount), 0) AS net_amount
            FROM session_settlements
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }
}
