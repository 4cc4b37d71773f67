use crate::error::AppResult;
use crate::http::dto::SettlementRequest;
use crate::http::CurrentUser;
use crate::ledger::SettlementSummary;
use crate::services::SettlementView;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;
use uuid::Uuid;

pub async fn get_settlement(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<SettlementView>> {
    let view = state
        .settlement_service
        .fetch(&current.user, session_id)
        .await?;
    Ok(Json(view))
}

pub async fn save_settlement(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SettlementRequest>,
) -> AppResult<Json<SettlementView>> {
    let view = state
        .settlement_service
        .save(&current.user, session_id, &req.expenses)
        .await?;
    Ok(Json(view))
}

pub async fn preview_settlement(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SettlementRequest>,
) -> AppResult<Json<SettlementSummary>> {
    let summary = state
        .settlement_service
        .preview(&current.user, session_id, &req.expenses)
        .await?;
    Ok(Json(summary))
}
