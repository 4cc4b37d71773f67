use crate::auth::SESSION_COOKIE;
use crate::error::AppError;
use crate::models::User;
use crate::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// The logged-in user, resolved from the session cookie.
///
/// Rejects with 401 when the cookie is missing, unknown or expired.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    /// Raw session token from the cookie
    pub token: String,
}

pub(crate) fn session_token(jar: &CookieJar) -> Result<String, AppError> {
    jar.get(SESSION_COOKIE)
        .map(|c| c.value().trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Not logged in".to_string()))
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = session_token(&jar)?;
        let user = state.auth_service.authenticate(&token).await?;
        Ok(CurrentUser { user, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::COOKIE, HeaderMap, HeaderValue};

    #[test]
    fn test_session_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; pokernight_session=abc123"),
        );
        let jar = CookieJar::from_headers(&headers);
        assert_eq!(session_token(&jar).unwrap(), "abc123");
    }

    #[test]
    fn test_missing_or_empty_cookie_is_unauthorized() {
        let jar = CookieJar::from_headers(&HeaderMap::new());
        assert!(matches!(session_token(&jar), Err(AppError::Unauthorized(_))));

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("pokernight_session="));
        let jar = CookieJar::from_headers(&headers);
        assert!(session_token(&jar).is_err());
    }
}
