use crate::error::AppResult;
use crate::http::dto::SearchQuery;
use crate::http::CurrentUser;
use crate::models::UserSummary;
use crate::services::UserStats;
use crate::AppState;
use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub users: Vec<UserSummary>,
}

pub async fn search_users(
    State(state): State<Arc<AppState>>,
    _current: CurrentUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<SearchResponse>> {
    let users = state.user_service.search(&query.q).await?;
    Ok(Json(SearchResponse { users }))
}

pub async fn my_stats(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> AppResult<Json<UserStats>> {
    Ok(Json(state.user_service.stats(&current.user).await?))
}
