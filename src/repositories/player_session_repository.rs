//! Seats and the ledger writes that move their stacks

use crate::error::RepositoryError;
use crate::models::{
    GameSession, PlayerSession, PlayerStatus, PlayerWithUser, SessionStatus, Transaction,
    TransactionType,
};
use crate::repositories::transaction_repository::TRANSACTION_COLUMNS;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgConnection, PgPool, Result as SqlxResult};
use uuid::Uuid;

const PLAYER_COLUMNS: &str = "id, game_session_id, user_id, status, stack, total_buy_in, \
     total_cash_out, joined_at, cashed_out_at";

/// A stack change plus the ledger row describing it
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    pub player: PlayerSession,
    pub transaction: Transaction,
}

struct NewTransaction<'a> {
    player: &'a PlayerSession,
    tx_type: TransactionType,
    amount: Decimal,
    stack_before: Decimal,
    stack_after: Decimal,
    recorded_by: Uuid,
    note: Option<&'a str>,
}

pub struct PlayerSessionRepository {
    pool: PgPool,
}

impl PlayerSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn find_by_id(&self, id: Uuid) -> SqlxResult<Option<PlayerSession>> {
        sqlx::query_as::<_, PlayerSession>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM player_sessions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_by_session_and_user(
        &self,
        game_session_id: Uuid,
        user_id: Uuid,
    ) -> SqlxResult<Option<PlayerSession>> {
        sqlx::query_as::<_, PlayerSession>(&format!(
            r#"
            SELECT {PLAYER_COLUMNS}
            FROM player_sessions
            WHERE game_session_id = $1 AND user_id = $2
            "#
        ))
        .bind(game_session_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Seats of a session with the players' names, in joining order
    pub async fn find_by_session(&self, game_session_id: Uuid) -> SqlxResult<Vec<PlayerWithUser>> {
        sqlx::query_as::<_, PlayerWithUser>(
            r#"
            SELECT p.id, p.game_session_id, p.user_id, u.name AS user_name, u.email AS user_email,
                   p.status, p.stack, p.total_buy_in, p.total_cash_out, p.joined_at, p.cashed_out_at
            FROM player_sessions p
            JOIN users u ON u.id = p.user_id
            WHERE p.game_session_id = $1
            ORDER BY p.joined_at ASC, p.id ASC
            "#,
        )
        .bind(game_session_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Number of sessions a user has taken a seat in
    pub async fn count_for_user(&self, user_id: Uuid) -> SqlxResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM player_sessions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
    }

    // =========================================================================
    // Ledger writes
    // =========================================================================

    /// Seat a user in a session with an initial buy-in
    pub async fn join(
        &self,
        game_session_id: Uuid,
        user_id: Uuid,
        buy_in: Decimal,
        recorded_by: Uuid,
        now: NaiveDateTime,
    ) -> Result<LedgerEntry, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        lock_ongoing_session(&mut tx, game_session_id).await?;

        let existing = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM player_sessions WHERE game_session_id = $1 AND user_id = $2",
        )
        .bind(game_session_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_some() {
            return Err(RepositoryError::BusinessRule(
                "Player is already in this session".to_string(),
            ));
        }

        let player = sqlx::query_as::<_, PlayerSession>(&format!(
            r#"
            INSERT INTO player_sessions (game_session_id, user_id, status, stack, total_buy_in, joined_at)
            VALUES ($1, $2, $3, $4, $4, $5)
            RETURNING {PLAYER_COLUMNS}
            "#
        ))
        .bind(game_session_id)
        .bind(user_id)
        .bind(PlayerStatus::Active.as_str())
        .bind(buy_in)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let transaction = insert_transaction(
            &mut tx,
            NewTransaction {
                player: &player,
                tx_type: TransactionType::BuyIn,
                amount: buy_in,
                stack_before: Decimal::ZERO,
                stack_after: buy_in,
                recorded_by,
                note: None,
            },
        )
        .await?;

        tx.commit().await?;

        Ok(LedgerEntry { player, transaction })
    }

    /// Add chips to an active player's stack
    pub async fn rebuy(
        &self,
        player_session_id: Uuid,
        amount: Decimal,
        recorded_by: Uuid,
        note: Option<&str>,
    ) -> Result<LedgerEntry, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = lock_player(&mut tx, player_session_id).await?;
        lock_ongoing_session(&mut tx, current.game_session_id).await?;
        require_active(&current)?;

        let stack_after = current.stack + amount;

        let player = sqlx::query_as::<_, PlayerSession>(&format!(
            r#"
            UPDATE player_sessions
            SET stack = $2, total_buy_in = total_buy_in + $3
            WHERE id = $1
            RETURNING {PLAYER_COLUMNS}
            "#
        ))
        .bind(player_session_id)
        .bind(stack_after)
        .bind(amount)
        .fetch_one(&mut *tx)
        .await?;

        let transaction = insert_transaction(
            &mut tx,
            NewTransaction {
                player: &player,
                tx_type: TransactionType::Rebuy,
                amount,
                stack_before: current.stack,
                stack_after,
                recorded_by,
                note,
            },
        )
        .await?;

        tx.commit().await?;

        Ok(LedgerEntry { player, transaction })
    }

    /// Take chips off the table. `amount` defaults to the whole stack; the
    /// player is CASHED_OUT once the stack reaches zero.
    pub async fn cash_out(
        &self,
        player_session_id: Uuid,
        amount: Option<Decimal>,
        recorded_by: Uuid,
        now: NaiveDateTime,
    ) -> Result<LedgerEntry, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = lock_player(&mut tx, player_session_id).await?;
        lock_ongoing_session(&mut tx, current.game_session_id).await?;
        require_active(&current)?;

        let amount = amount.unwrap_or(current.stack);
        if amount > current.stack {
            return Err(RepositoryError::BusinessRule(format!(
                "Stack cannot go negative: stack {}, cash-out {}",
                current.stack, amount
            )));
        }

        let stack_after = current.stack - amount;
        let (status, cashed_out_at) = if stack_after.is_zero() {
            (PlayerStatus::CashedOut, Some(now))
        } else {
            (PlayerStatus::Active, None)
        };

        let player = sqlx::query_as::<_, PlayerSession>(&format!(
            r#"
            UPDATE player_sessions
            SET stack = $2, total_cash_out = total_cash_out + $3, status = $4, cashed_out_at = $5
            WHERE id = $1
            RETURNING {PLAYER_COLUMNS}
            "#
        ))
        .bind(player_session_id)
        .bind(stack_after)
        .bind(amount)
        .bind(status.as_str())
        .bind(cashed_out_at)
        .fetch_one(&mut *tx)
        .await?;

        let transaction = insert_transaction(
            &mut tx,
            NewTransaction {
                player: &player,
                tx_type: TransactionType::CashOut,
                amount,
                stack_before: current.stack,
                stack_after,
                recorded_by,
                note: None,
            },
        )
        .await?;

        tx.commit().await?;

        Ok(LedgerEntry { player, transaction })
    }

    /// Record the player's current chip count after play. The ledger row
    /// carries the signed difference.
    pub async fn adjust_stack(
        &self,
        player_session_id: Uuid,
        new_stack: Decimal,
        recorded_by: Uuid,
        note: Option<&str>,
    ) -> Result<LedgerEntry, RepositoryError> {
        if new_stack < Decimal::ZERO {
            return Err(RepositoryError::BusinessRule(
                "Stack cannot go negative".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let current = lock_player(&mut tx, player_session_id).await?;
        lock_ongoing_session(&mut tx, current.game_session_id).await?;
        require_active(&current)?;

        let player = sqlx::query_as::<_, PlayerSession>(&format!(
            r#"
            UPDATE player_sessions
            SET stack = $2
            WHERE id = $1
            RETURNING {PLAYER_COLUMNS}
            "#
        ))
        .bind(player_session_id)
        .bind(new_stack)
        .fetch_one(&mut *tx)
        .await?;

        let transaction = insert_transaction(
            &mut tx,
            NewTransaction {
                player: &player,
                tx_type: TransactionType::Adjustment,
                amount: new_stack - current.stack,
                stack_before: current.stack,
                stack_after: new_stack,
                recorded_by,
                note,
            },
        )
        .await?;

        tx.commit().await?;

        Ok(LedgerEntry { player, transaction })
    }
}

async fn lock_player(
    conn: &mut PgConnection,
    player_session_id: Uuid,
) -> Result<PlayerSession, RepositoryError> {
    sqlx::query_as::<_, PlayerSession>(&format!(
        "SELECT {PLAYER_COLUMNS} FROM player_sessions WHERE id = $1 FOR UPDATE"
    ))
    .bind(player_session_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| RepositoryError::NotFound("Player not found".to_string()))
}

/// Share-lock the session row; completion takes it exclusively, so a ledger
/// write and a completion never interleave.
async fn lock_ongoing_session(
    conn: &mut PgConnection,
    game_session_id: Uuid,
) -> Result<GameSession, RepositoryError> {
    let session = sqlx::query_as::<_, GameSession>(
        r#"
        SELECT id, name, host_id, buy_in, location, notes, status, started_at, ended_at, created_at
        FROM game_sessions
        WHERE id = $1
        FOR SHARE
        "#,
    )
    .bind(game_session_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| RepositoryError::NotFound("Session not found".to_string()))?;

    if session.status_enum() != SessionStatus::Ongoing {
        return Err(RepositoryError::BusinessRule(
            "Session is already completed".to_string(),
        ));
    }

    Ok(session)
}

fn require_active(player: &PlayerSession) -> Result<(), RepositoryError> {
    if player.is_active() {
        Ok(())
    } else {
        Err(RepositoryError::BusinessRule(
            "Player has already cashed out".to_string(),
        ))
    }
}

async fn insert_transaction(
    conn: &mut PgConnection,
    new: NewTransaction<'_>,
) -> Result<Transaction, RepositoryError> {
    let transaction = sqlx::query_as::<_, Transaction>(&format!(
        r#"
        INSERT INTO transactions
        (player_session_id, game_session_id, user_id, transaction_type, amount,
         stack_before, stack_after, recorded_by, note)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {TRANSACTION_COLUMNS}
        "#
    ))
    .bind(new.player.id)
    .bind(new.player.game_session_id)
    .bind(new.player.user_id)
    .bind(new.tx_type.as_str())
    .bind(new.amount)
    .bind(new.stack_before)
    .bind(new.stack_after)
    .bind(new.recorded_by)
    .bind(new.note)
    .fetch_one(&mut *conn)
    .await?;

    Ok(transaction)
}
