//! Login sessions and password reset tokens

use crate::error::RepositoryError;
use crate::models::{AuthSession, PasswordResetToken, User};
use chrono::NaiveDateTime;
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

pub struct AuthRepository {
    pool: PgPool,
}

impl AuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Login sessions
    // =========================================================================

    pub async fn create_session(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: NaiveDateTime,
    ) -> SqlxResult<AuthSession> {
        sqlx::query_as::<_, AuthSession>(
            r#"
            INSERT INTO auth_sessions (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token_hash, created_at, expires_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
    }

    /// Resolve a token hash to its user, ignoring expired sessions
    pub async fn find_user_by_session(
        &self,
        token_hash: &str,
        now: NaiveDateTime,
    ) -> SqlxResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.name, u.email, u.password_hash, u.role, u.created_at, u.updated_at
            FROM auth_sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token_hash = $1 AND s.expires_at > $2
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete_session(&self, token_hash: &str) -> SqlxResult<bool> {
        let rows_affected = sqlx::query("DELETE FROM auth_sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    /// Revoke a user's sessions, optionally keeping the caller's own
    pub async fn delete_sessions_for_user(
        &self,
        user_id: Uuid,
        keep_token_hash: Option<&str>,
    ) -> SqlxResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM auth_sessions
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR token_hash <> $2)
            "#,
        )
        .bind(user_id)
        .bind(keep_token_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Remove expired sessions and spent or expired reset tokens
    pub async fn purge_expired(&self, now: NaiveDateTime) -> SqlxResult<u64> {
        let sessions = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        let tokens = sqlx::query(
            "DELETE FROM password_reset_tokens WHERE expires_at <= $1 OR used_at IS NOT NULL",
        )
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(sessions + tokens)
    }

    // =========================================================================
    // Password reset
    // =========================================================================

    /// Store a new reset token, discarding any earlier unused ones
    pub async fn create_reset_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: NaiveDateTime,
    ) -> Result<PasswordResetToken, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1 AND used_at IS NULL")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let token = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            INSERT INTO password_reset_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token_hash, created_at, expires_at, used_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(token)
    }

    /// Redeem a reset token: mark it used, set the new password hash and
    /// revoke every login session of the user, all in one transaction.
    pub async fn redeem_reset_token(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: NaiveDateTime,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let token = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            SELECT id, user_id, token_hash, created_at, expires_at, used_at
            FROM password_reset_tokens
            WHERE token_hash = $1
            FOR UPDATE
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::BusinessRule("Invalid or expired reset token".to_string()))?;

        if !token.is_redeemable(now) {
            return Err(RepositoryError::BusinessRule(
                "Invalid or expired reset token".to_string(),
            ));
        }

        sqlx::query("UPDATE password_reset_tokens SET used_at = $2 WHERE id = $1")
            .bind(token.id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, name, email, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(token.user_id)
        .bind(new_password_hash)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM auth_sessions WHERE user_id = $1")
            .bind(token.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(user)
    }
}
