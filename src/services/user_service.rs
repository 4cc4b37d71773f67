use crate::auth;
use crate::error::{AppError, AppResult};
use crate::models::{SettlementTotals, User, UserRole, UserSummary};
use crate::repositories::{PlayerSessionRepository, SettlementRepository, UserRepository};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const MIN_SEARCH_LEN: usize = 2;
const SEARCH_LIMIT: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// Lifetime numbers for one user
#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub user_id: Uuid,
    pub sessions_played: i64,
    #[serde(flatten)]
    pub settled: SettlementTotals,
}

/// One page of the admin user list
#[derive(Debug, Clone, Serialize)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Lookups, stats and admin user management
pub struct UserService {
    user_repo: Arc<UserRepository>,
    player_repo: Arc<PlayerSessionRepository>,
    settlement_repo: Arc<SettlementRepository>,
}

impl UserService {
    pub fn new(
        user_repo: Arc<UserRepository>,
        player_repo: Arc<PlayerSessionRepository>,
        settlement_repo: Arc<SettlementRepository>,
    ) -> Self {
        Self {
            user_repo,
            player_repo,
            settlement_repo,
        }
    }

    /// Find users by name or email, for adding players to a session
    pub async fn search(&self, query: &str) -> AppResult<Vec<UserSummary>> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LEN {
            return Err(AppError::Validation(format!(
                "Search query must be at least {} characters",
                MIN_SEARCH_LEN
            )));
        }
        Ok(self.user_repo.search(query, SEARCH_LIMIT).await?)
    }

    pub async fn stats(&self, user: &User) -> AppResult<UserStats> {
        let sessions_played = self.player_repo.count_for_user(user.id).await?;
        let settled = self.settlement_repo.totals_for_user(user.id).await?;
        Ok(UserStats {
            user_id: user.id,
            sessions_played,
            settled,
        })
    }

    pub async fn list_users(&self, actor: &User, limit: i64, offset: i64) -> AppResult<UserPage> {
        auth::require_admin(actor)?;

        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let offset = offset.max(0);
        let users = self.user_repo.list(limit, offset).await?;
        let total = self.user_repo.count().await?;

        Ok(UserPage {
            users,
            total,
            limit,
            offset,
        })
    }

    pub async fn set_role(&self, actor: &User, user_id: Uuid, role: UserRole) -> AppResult<User> {
        auth::require_admin(actor)?;
        if actor.id == user_id && role != UserRole::Admin {
            return Err(AppError::BusinessLogic(
                "You cannot remove your own admin role".to_string(),
            ));
        }

        let user = self
            .user_repo
            .update_role(user_id, role)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        info!("User {} set role of {} to {}", actor.id, user.id, role.as_str());
        Ok(user)
    }

    pub async fn delete_user(&self, actor: &User, user_id: Uuid) -> AppResult<()> {
        auth::require_admin(actor)?;
        if actor.id == user_id {
            return Err(AppError::BusinessLogic(
                "You cannot delete your own account".to_string(),
            ));
        }

        if !self.user_repo.delete(user_id).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        info!("User {} deleted user {}", actor.id, user_id);
        Ok(())
    }
}
