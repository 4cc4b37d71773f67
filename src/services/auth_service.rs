use crate::auth;
use crate::config::AuthConfig;
use crate::error::{AppError, AppResult, RepositoryError};
use crate::mailer::{self, Mailer};
use crate::models::{User, UserRole};
use crate::repositories::{AuthRepository, UserRepository};
use chrono::{Duration, NaiveDateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

const MAX_NAME_LEN: usize = 100;

/// A freshly issued login session. `token` goes into the cookie and is not
/// stored anywhere server side.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub user: User,
    pub token: String,
    pub expires_at: NaiveDateTime,
}

/// Registration, login and password management
pub struct AuthService {
    user_repo: Arc<UserRepository>,
    auth_repo: Arc<AuthRepository>,
    mailer: Arc<dyn Mailer>,
    config: AuthConfig,
    app_base_url: String,
}

pub(crate) fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "Name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

impl AuthService {
    pub fn new(
        user_repo: Arc<UserRepository>,
        auth_repo: Arc<AuthRepository>,
        mailer: Arc<dyn Mailer>,
        config: AuthConfig,
        app_base_url: String,
    ) -> Self {
        Self {
            user_repo,
            auth_repo,
            mailer,
            config,
            app_base_url,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Create an account and log it in
    pub async fn register(&self, name: &str, email: &str, password: &str) -> AppResult<IssuedSession> {
        let name = validate_name(name)?;
        let email = auth::normalize_email(email)?;
        auth::validate_password(password)?;

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::BusinessLogic(
                "An account with this email already exists".to_string(),
            ));
        }

        let role = if self.config.is_admin_email(&email) {
            UserRole::Admin
        } else {
            UserRole::User
        };

        let password_hash = auth::hash_password(password)?;
        let user = self
            .user_repo
            .create(&name, &email, &password_hash, role)
            .await
            .map_err(|e| match RepositoryError::from(e) {
                // Lost a race with a concurrent registration
                RepositoryError::Duplicate(_) => AppError::BusinessLogic(
                    "An account with this email already exists".to_string(),
                ),
                other => AppError::from(other),
            })?;

        info!("Registered user {} ({})", user.id, role.as_str());

        mailer::send_best_effort(
            self.mailer.as_ref(),
            mailer::welcome_email(&user.email, &user.name, &self.app_base_url),
        )
        .await;

        self.issue_session(user).await
    }

    /// Verify credentials and start a session
    pub async fn login(&self, email: &str, password: &str) -> AppResult<IssuedSession> {
        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

        let email = auth::normalize_email(email).map_err(|_| invalid())?;
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or_else(invalid)?;

        if !auth::verify_password(password, &user.password_hash)? {
            warn!("Failed login for user {}", user.id);
            return Err(invalid());
        }

        info!("User {} logged in", user.id);
        self.issue_session(user).await
    }

    pub async fn logout(&self, token: &str) -> AppResult<()> {
        self.auth_repo.delete_session(&auth::hash_token(token)).await?;
        Ok(())
    }

    /// Resolve a session token to its user
    pub async fn authenticate(&self, token: &str) -> AppResult<User> {
        let now = Utc::now().naive_utc();
        self.auth_repo
            .find_user_by_session(&auth::hash_token(token), now)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Session expired or invalid".to_string()))
    }

    /// Change password while logged in. Other sessions are revoked; the
    /// caller's own session stays valid.
    pub async fn change_password(
        &self,
        user: &User,
        current_token: &str,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        if !auth::verify_password(current_password, &user.password_hash)? {
            return Err(AppError::Validation("Current password is incorrect".to_string()));
        }
        auth::validate_password(new_password)?;

        let password_hash = auth::hash_password(new_password)?;
        self.user_repo.update_password(user.id, &password_hash).await?;

        let revoked = self
            .auth_repo
            .delete_sessions_for_user(user.id, Some(&auth::hash_token(current_token)))
            .await?;

        info!("User {} changed password, revoked {} other session(s)", user.id, revoked);
        Ok(())
    }

    /// Email a reset link if the account exists. Succeeds either way so the
    /// endpoint does not reveal which emails are registered.
    pub async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        let Ok(email) = auth::normalize_email(email) else {
            return Ok(());
        };

        let Some(user) = self.user_repo.find_by_email(&email).await? else {
            info!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = auth::generate_token();
        let expires_at =
            Utc::now().naive_utc() + Duration::minutes(auth::RESET_TOKEN_TTL_MINUTES);
        self.auth_repo
            .create_reset_token(user.id, &auth::hash_token(&token), expires_at)
            .await?;

        info!("Issued password reset token for user {}", user.id);

        mailer::send_best_effort(
            self.mailer.as_ref(),
            mailer::password_reset_email(&user.email, &user.name, &self.app_base_url, &token),
        )
        .await;

        Ok(())
    }

    /// Redeem a reset token and set a new password. All sessions of the
    /// user are revoked.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<()> {
        auth::validate_password(new_password)?;
        if token.trim().is_empty() {
            return Err(AppError::Validation("Reset token is required".to_string()));
        }

        let password_hash = auth::hash_password(new_password)?;
        let user = self
            .auth_repo
            .redeem_reset_token(
                &auth::hash_token(token.trim()),
                &password_hash,
                Utc::now().naive_utc(),
            )
            .await?;

        info!("User {} reset their password", user.id);
        Ok(())
    }

    /// Housekeeping for the background purge task
    pub async fn purge_expired(&self) -> AppResult<u64> {
        Ok(self.auth_repo.purge_expired(Utc::now().naive_utc()).await?)
    }

    async fn issue_session(&self, user: User) -> AppResult<IssuedSession> {
        let token = auth::generate_token();
        let expires_at = self
            .config
            .session_expiry(Utc::now().naive_utc())
            .ok_or_else(|| AppError::Config("SESSION_TTL_HOURS is out of range".to_string()))?;

        self.auth_repo
            .create_session(user.id, &auth::hash_token(&token), expires_at)
            .await?;

        Ok(IssuedSession {
            user,
            token,
            expires_at,
        })
    }
}
