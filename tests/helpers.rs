#![allow(dead_code)]

use async_trait::async_trait;
use pokernight_backend::auth;
use pokernight_backend::config::AppConfig;
use pokernight_backend::error::AppResult;
use pokernight_backend::mailer::{EmailMessage, Mailer};
use pokernight_backend::models::*;
use pokernight_backend::AppState;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const TEST_PASSWORD: &str = "hunter2hunter2";

/// Mailer that keeps every message in memory
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub async fn last_to(&self, to: &str) -> Option<EmailMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|m| m.to == to)
            .cloned()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> AppResult<()> {
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}

/// Application state over a test pool, with outgoing mail captured
pub struct TestDatabase {
    pub pool: PgPool,
    pub state: Arc<AppState>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestDatabase {
    /// Create TestDatabase from an existing pool (useful with sqlx::test)
    pub async fn from_pool(pool: PgPool) -> Self {
        Self::with_config(pool, test_config()).await
    }

    pub async fn with_config(pool: PgPool, config: AppConfig) -> Self {
        let mailer = Arc::new(RecordingMailer::default());
        let state = Arc::new(AppState::with_mailer(pool.clone(), config, mailer.clone()));
        Self {
            pool,
            state,
            mailer,
        }
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.app_base_url = "http://poker.test".to_string();
    config.auth.admin_emails = vec!["admin@example.com".to_string()];
    config
}

/// Helper function to create a test user directly through the repository
pub async fn create_test_user(db: &TestDatabase, name: &str, email: &str) -> User {
    let hash = auth::hash_password(TEST_PASSWORD).expect("Failed to hash password");
    db.state
        .user_repo
        .create(name, email, &hash, UserRole::User)
        .await
        .expect("Failed to create test user")
}

pub async fn create_test_admin(db: &TestDatabase, name: &str, email: &str) -> User {
    let hash = auth::hash_password(TEST_PASSWORD).expect("Failed to hash password");
    db.state
        .user_repo
        .create(name, email, &hash, UserRole::Admin)
        .await
        .expect("Failed to create test admin")
}

/// Helper function to create a session hosted by `host`
pub async fn create_test_session(db: &TestDatabase, host: &User, buy_in: Decimal) -> GameSession {
    db.state
        .session_repo
        .create(host.id, "Friday Night", buy_in, Some("Dana's kitchen"), None)
        .await
        .expect("Failed to create test session")
}

/// Host, two players and an ongoing session with a 20.00 buy-in
pub struct TestFixtures {
    pub host: User,
    pub alice: User,
    pub bob: User,
    pub session: GameSession,
}

impl TestFixtures {
    pub async fn create(db: &TestDatabase) -> Self {
        let host = create_test_user(db, "Dana Host", "dana@example.com").await;
        let alice = create_test_user(db, "Alice", "alice@example.com").await;
        let bob = create_test_user(db, "Bob", "bob@example.com").await;
        let session = create_test_session(db, &host, dec("20.00")).await;

        Self {
            host,
            alice,
            bob,
            session,
        }
    }
}

pub fn dec(s: &str) -> Decimal {
    s.parse().expect("valid decimal literal")
}

/// Pull the reset token out of the link in a password reset email
pub fn token_from_email(message: &EmailMessage) -> String {
    let start = message
        .text
        .find("token=")
        .expect("reset link in email")
        + "token=".len();
    message.text[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect()
}
