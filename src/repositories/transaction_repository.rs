use crate::models::Transaction;
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

pub(crate) const TRANSACTION_COLUMNS: &str = "id, player_session_id, game_session_id, user_id, \
     transaction_type, amount, stack_before, stack_after, recorded_by, note, created_at";

/// Read access to the ledger. Writes go through `PlayerSessionRepository`
/// so that every ledger row is written together with the stack it changes.
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ledger of a whole session in the order it was written
    pub async fn find_by_session(&self, game_session_id: Uuid) -> SqlxResult<Vec<Transaction>> {
        sqlx::query_as::<_, Transaction>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions
            WHERE game_session_id = $1
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(game_session_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Ledger of one seat
    pub async fn find_by_player(&self, player_session_id: Uuid) -> SqlxResult<Vec<Transaction>> {
        sqlx::query_as::<_, Transaction>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions
            WHERE player_session_id = $1
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(player_session_id)
        .fetch_all(&self.pool)
        .await
    }
}
