//! Poker Night Backend Library
//!
//! Tracks private poker games: sessions, buy-ins and cash-outs, and the
//! settle-up once a game ends. This module exposes the backend components
//! for use by the binary and by tests.

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod http;
pub mod ledger;
pub mod mailer;
pub mod models;
pub mod repositories;
pub mod services;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use database::Database;
use mailer::Mailer;
use repositories::*;
use services::*;
use std::sync::Arc;

/// Application state containing all repositories and services
pub struct AppState {
    pub database: Database,
    pub config: AppConfig,
    pub user_repo: Arc<UserRepository>,
    pub auth_repo: Arc<AuthRepository>,
    pub session_repo: Arc<GameSessionRepository>,
    pub player_repo: Arc<PlayerSessionRepository>,
    pub transaction_repo: Arc<TransactionRepository>,
    pub settlement_repo: Arc<SettlementRepository>,
    pub auth_service: Arc<AuthService>,
    pub game_session_service: Arc<GameSessionService>,
    pub ledger_service: Arc<LedgerService>,
    pub settlement_service: Arc<SettlementService>,
    pub user_service: Arc<UserService>,
}

impl AppState {
    /// Create a new AppState, picking the mailer from the configuration
    pub fn new(pool: sqlx::PgPool, config: AppConfig) -> Self {
        let mailer = mailer::from_config(&config.mail);
        Self::with_mailer(pool, config, mailer)
    }

    /// Create a new AppState with an explicit mailer
    pub fn with_mailer(pool: sqlx::PgPool, config: AppConfig, mailer: Arc<dyn Mailer>) -> Self {
        let database = Database::new(pool.clone());

        let user_repo = Arc::new(UserRepository::new(pool.clone()));
        let auth_repo = Arc::new(AuthRepository::new(pool.clone()));
        let session_repo = Arc::new(GameSessionRepository::new(pool.clone()));
        let player_repo = Arc::new(PlayerSessionRepository::new(pool.clone()));
        let transaction_repo = Arc::new(TransactionRepository::new(pool.clone()));
        let settlement_repo = Arc::new(SettlementRepository::new(pool));

        let auth_service = Arc::new(AuthService::new(
            user_repo.clone(),
            auth_repo.clone(),
            mailer,
            config.auth.clone(),
            config.app_base_url.clone(),
        ));
        let game_session_service = Arc::new(GameSessionService::new(
            session_repo.clone(),
            player_repo.clone(),
            transaction_repo.clone(),
        ));
        let ledger_service = Arc::new(LedgerService::new(
            session_repo.clone(),
            player_repo.clone(),
            transaction_repo.clone(),
            user_repo.clone(),
        ));
        let settlement_service = Arc::new(SettlementService::new(
            session_repo.clone(),
            player_repo.clone(),
            settlement_repo.clone(),
        ));
        let user_service = Arc::new(UserService::new(
            user_repo.clone(),
            player_repo.clone(),
            settlement_repo.clone(),
        ));

        Self {
            database,
            config,
            user_repo,
            auth_repo,
            session_repo,
            player_repo,
            transaction_repo,
            settlement_repo,
            auth_service,
            game_session_service,
            ledger_service,
            settlement_service,
            user_service,
        }
    }
}
