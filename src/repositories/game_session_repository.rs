use crate::error::RepositoryError;
use crate::models::{GameSession, PlayerStatus, SessionStatus};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

const SESSION_COLUMNS: &str =
    "id, name, host_id, buy_in, location, notes, status, started_at, ended_at, created_at";

/// Repository for game session data access
pub struct GameSessionRepository {
    pool: PgPool,
}

impl GameSessionRepository {
    /// Create a new GameSessionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new game session
    pub async fn create(
        &self,
        host_id: Uuid,
        name: &str,
        buy_in: Decimal,
        location: Option<&str>,
        notes: Option<&str>,
    ) -> SqlxResult<GameSession> {
        sqlx::query_as::<_, GameSession>(&format!(
            r#"
            INSERT INTO game_sessions (host_id, name, buy_in, location, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(host_id)
        .bind(name)
        .bind(buy_in)
        .bind(location)
        .bind(notes)
        .fetch_one(&self.pool)
        .await
    }

    /// Find a game session by UUID
    pub async fn find_by_id(&self, id: Uuid) -> SqlxResult<Option<GameSession>> {
        sqlx::query_as::<_, GameSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM game_sessions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Sessions the user hosts or plays in, most recent first
    pub async fn list_for_user(&self, user_id: Uuid) -> SqlxResult<Vec<GameSession>> {
        sqlx::query_as::<_, GameSession>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM game_sessions
            WHERE host_id = $1
               OR id IN (SELECT game_session_id FROM player_sessions WHERE user_id = $1)
            ORDER BY started_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Every session, most recent first
    pub async fn list_all(&self, limit: i64, offset: i64) -> SqlxResult<Vec<GameSession>> {
        sqlx::query_as::<_, GameSession>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM game_sessions
            ORDER BY started_at DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    /// Mark a session COMPLETED.
    ///
    /// Locks the session row so no ledger write can slip in between the
    /// active-player check and the status change.
    pub async fn complete(
        &self,
        id: Uuid,
        ended_at: NaiveDateTime,
    ) -> Result<GameSession, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let session = sqlx::query_as::<_, GameSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM game_sessions WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("Session not found".to_string()))?;

        if session.is_completed() {
            return Err(RepositoryError::BusinessRule(
                "Session is already completed".to_string(),
            ));
        }

        let active_players = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM player_sessions
            WHERE game_session_id = $1 AND status = $2
            "#,
        )
        .bind(id)
        .bind(PlayerStatus::Active.as_str())
        .fetch_one(&mut *tx)
        .await?;

        if active_players > 0 {
            return Err(RepositoryError::BusinessRule(format!(
                "Cannot complete session: {} player(s) still active",
                active_players
            )));
        }

        let completed = sqlx::query_as::<_, GameSession>(&format!(
            r#"
            UPDATE game_sessions
            SET status = $2, ended_at = $3
            WHERE id = $1
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(SessionStatus::Completed.as_str())
        .bind(ended_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(completed)
    }

    /// Delete a session; seats, ledger rows and settlements cascade
    pub async fn delete(&self, id: Uuid) -> SqlxResult<bool> {
        let rows_affected = sqlx::query("DELETE FROM game_sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
