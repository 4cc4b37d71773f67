use crate::error::AppResult;
use crate::http::cookies::{removal_cookie, session_cookie};
use crate::http::dto::{
    AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, MessageResponse,
    RegisterRequest, ResetPasswordRequest, UserResponse,
};
use crate::http::CurrentUser;
use crate::services::IssuedSession;
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

fn signed_in(
    state: &AppState,
    jar: CookieJar,
    issued: IssuedSession,
) -> (CookieJar, Json<AuthResponse>) {
    let jar = jar.add(session_cookie(issued.token, state.auth_service.config()));
    (
        jar,
        Json(AuthResponse {
            user: issued.user,
            expires_at: issued.expires_at,
        }),
    )
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, CookieJar, Json<AuthResponse>)> {
    let issued = state
        .auth_service
        .register(&req.name, &req.email, &req.password)
        .await?;
    let (jar, body) = signed_in(&state, jar, issued);
    Ok((StatusCode::CREATED, jar, body))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let issued = state.auth_service.login(&req.email, &req.password).await?;
    Ok(signed_in(&state, jar, issued))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<MessageResponse>)> {
    state.auth_service.logout(&current.token).await?;
    Ok((
        jar.remove(removal_cookie()),
        Json(MessageResponse::new("Logged out")),
    ))
}

pub async fn me(current: CurrentUser) -> Json<UserResponse> {
    Json(UserResponse { user: current.user })
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .auth_service
        .change_password(
            &current.user,
            &current.token,
            &req.current_password,
            &req.new_password,
        )
        .await?;
    Ok(Json(MessageResponse::new("Password updated")))
}

/// Same answer whether or not the email is registered
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.auth_service.request_password_reset(&req.email).await?;
    Ok(Json(MessageResponse::new(
        "If an account exists for that email, a reset link has been sent",
    )))
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .auth_service
        .reset_password(&req.token, &req.password)
        .await?;
    Ok(Json(MessageResponse::new("Password has been reset, please log in")))
}
