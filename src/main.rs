//! Poker Night Backend Service
//!
//! Main entry point. Serves the JSON API over HTTP and runs a background
//! task that purges expired login sessions and reset tokens.

use pokernight_backend::config::AppConfig;
use pokernight_backend::database::Database;
use pokernight_backend::error::{AppError, AppResult};
use pokernight_backend::{http, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};

const PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "pokernight_backend={},sqlx=warn,tower_http=info",
            config.log_level
        )
        .into()
    });

    if config.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    init_tracing(&config);

    info!("Poker Night backend starting");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    info!("HTTP port: {}", config.http_port);
    if config.mail.api_url.is_none() {
        info!("MAIL_API_URL not set, emails will be logged instead of sent");
    }

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================
    info!("Connecting to database...");

    let database = Database::connect(&config.database).await.map_err(|e| {
        error!("Failed to connect to database: {}", e);
        AppError::Database(e)
    })?;

    info!("Running database migrations...");
    database.migrate().await.map_err(|e| {
        error!("Database migration failed: {}", e);
        AppError::Database(e)
    })?;

    info!("Database migrations completed successfully");

    let http_port = config.http_port;
    let app_state = Arc::new(AppState::new(database.into_pool(), config));

    // =========================================================================
    // BACKGROUND TASKS
    // =========================================================================
    let auth_service = app_state.auth_service.clone();
    let purge_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match auth_service.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => info!("Purged {} expired session(s) and token(s)", purged),
                Err(e) => error!("Failed to purge expired sessions: {}", e),
            }
        }
    });

    // =========================================================================
    // HTTP SERVER
    // =========================================================================
    let addr = SocketAddr::from(([0, 0, 0, 0], http_port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Message(format!("Failed to bind {}: {}", addr, e)))?;

    let router = http::build_router(app_state);
    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("HTTP server error: {}", e);
        }
    });

    info!("Listening on {}", addr);
    info!("Press Ctrl+C to shutdown gracefully");

    // =========================================================================
    // SHUTDOWN HANDLING
    // =========================================================================
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down gracefully...");
        }
        _ = server_handle => {
            error!("HTTP server exited unexpectedly");
        }
        _ = purge_handle => {
            error!("Purge task exited unexpectedly");
        }
    }

    info!("Poker Night backend shutdown complete");
    Ok(())
}
