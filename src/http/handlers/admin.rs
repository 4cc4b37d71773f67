use crate::error::AppResult;
use crate::http::dto::{MessageResponse, PageQuery, SetRoleRequest, UserResponse};
use crate::http::CurrentUser;
use crate::services::UserPage;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use std::sync::Arc;
use uuid::Uuid;

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<UserPage>> {
    let page = state
        .user_service
        .list_users(&current.user, page.limit, page.offset)
        .await?;
    Ok(Json(page))
}

pub async fn set_role(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(req): Json<SetRoleRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .user_service
        .set_role(&current.user, user_id, req.role)
        .await?;
    Ok(Json(UserResponse { user }))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state
        .user_service
        .delete_user(&current.user, user_id)
        .await?;
    Ok(Json(MessageResponse::new("User deleted")))
}
