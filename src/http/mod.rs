//! JSON API over axum.

pub mod cookies;
pub mod dto;
pub mod extract;
pub mod handlers;

pub use extract::CurrentUser;

use crate::AppState;
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use handlers::{admin, auth, health, players, sessions, settlements, users};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.app_base_url);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness))
        // Auth routes
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/password", post(auth::change_password))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
        // Session routes
        .route(
            "/api/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route(
            "/api/sessions/:session_id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route(
            "/api/sessions/:session_id/complete",
            post(sessions::complete_session),
        )
        .route(
            "/api/sessions/:session_id/transactions",
            get(sessions::list_transactions),
        )
        // Player routes
        .route("/api/sessions/:session_id/players", post(players::add_player))
        .route(
            "/api/sessions/:session_id/players/:player_id/rebuy",
            post(players::rebuy),
        )
        .route(
            "/api/sessions/:session_id/players/:player_id/cash-out",
            post(players::cash_out),
        )
        .route(
            "/api/sessions/:session_id/players/:player_id/stack",
            post(players::adjust_stack),
        )
        // Settlement routes
        .route(
            "/api/sessions/:session_id/settlement",
            get(settlements::get_settlement).post(settlements::save_settlement),
        )
        .route(
            "/api/sessions/:session_id/settlement/preview",
            post(settlements::preview_settlement),
        )
        // User routes
        .route("/api/users/search", get(users::search_users))
        .route("/api/users/me/stats", get(users::my_stats))
        // Admin routes
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/:user_id/role", put(admin::set_role))
        .route(
            "/api/admin/users/:user_id",
            axum::routing::delete(admin::delete_user),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// The session cookie only travels with credentialed requests, so the
/// frontend origin has to be named explicitly.
fn cors_layer(app_base_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(app_base_url) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            warn!("APP_BASE_URL {:?} is not a valid origin, CORS disabled", app_base_url);
            layer
        }
    }
}
