use crate::error::AppResult;
use crate::http::dto::{AddPlayerRequest, AdjustStackRequest, CashOutRequest, RebuyRequest};
use crate::http::CurrentUser;
use crate::repositories::LedgerEntry;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use uuid::Uuid;

pub async fn add_player(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(session_id): Path<Uuid>,
    Json(req): Json<AddPlayerRequest>,
) -> AppResult<(StatusCode, Json<LedgerEntry>)> {
    let entry = state
        .ledger_service
        .add_player(&current.user, session_id, req.user_id, req.buy_in)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn rebuy(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path((session_id, player_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<RebuyRequest>,
) -> AppResult<Json<LedgerEntry>> {
    let entry = state
        .ledger_service
        .rebuy(
            &current.user,
            session_id,
            player_id,
            req.amount,
            req.note.as_deref(),
        )
        .await?;
    Ok(Json(entry))
}

pub async fn cash_out(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path((session_id, player_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<CashOutRequest>,
) -> AppResult<Json<LedgerEntry>> {
    let entry = state
        .ledger_service
        .cash_out(&current.user, session_id, player_id, req.amount)
        .await?;
    Ok(Json(entry))
}

pub async fn adjust_stack(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path((session_id, player_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<AdjustStackRequest>,
) -> AppResult<Json<LedgerEntry>> {
    let entry = state
        .ledger_service
        .adjust_stack(
            &current.user,
            session_id,
            player_id,
            req.stack,
            req.note.as_deref(),
        )
        .await?;
    Ok(Json(entry))
}
