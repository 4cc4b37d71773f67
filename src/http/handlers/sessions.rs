use crate::error::AppResult;
use crate::http::dto::{
    CreateSessionRequest, ListSessionsQuery, MessageResponse, SessionResponse, SessionsResponse,
};
use crate::http::CurrentUser;
use crate::models::Transaction;
use crate::services::{NewGameSession, SessionDetail};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
}

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(query): Query<ListSessionsQuery>,
) -> AppResult<Json<SessionsResponse>> {
    let sessions = state
        .game_session_service
        .list_sessions(&current.user, query.all)
        .await?;
    Ok(Json(SessionsResponse { sessions }))
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<CreateSessionRequest>,
) -> AppResult<(StatusCode, Json<SessionResponse>)> {
    let session = state
        .game_session_service
        .create_session(
            &current.user,
            NewGameSession {
                name: req.name,
                buy_in: req.buy_in,
                location: req.location,
                notes: req.notes,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(SessionResponse { session })))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<SessionDetail>> {
    let detail = state
        .game_session_service
        .get_session_detail(&current.user, session_id)
        .await?;
    Ok(Json(detail))
}

pub async fn complete_session(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    let session = state
        .game_session_service
        .complete_session(&current.user, session_id)
        .await?;
    Ok(Json(SessionResponse { session }))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state
        .game_session_service
        .delete_session(&current.user, session_id)
        .await?;
    Ok(Json(MessageResponse::new("Session deleted")))
}

pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<TransactionsResponse>> {
    let transactions = state
        .ledger_service
        .list_transactions(&current.user, session_id)
        .await?;
    Ok(Json(TransactionsResponse { transactions }))
}
