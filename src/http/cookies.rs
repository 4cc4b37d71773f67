use crate::auth::SESSION_COOKIE;
use crate::config::AuthConfig;
use axum_extra::extract::cookie::{Cookie, SameSite};

/// Cookie carrying a freshly issued session token
pub fn session_cookie(token: String, config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(config.secure_cookies)
        .max_age(time::Duration::hours(config.session_ttl_hours))
        .build()
}

/// Cookie that clears the session on the client
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let config = AuthConfig {
            session_ttl_hours: 2,
            secure_cookies: true,
            ..AuthConfig::default()
        };
        let cookie = session_cookie("tok".to_string(), &config);

        assert_eq!(cookie.name(), "pokernight_session");
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(2)));
    }

    #[test]
    fn test_removal_cookie_matches_path() {
        let cookie = removal_cookie();
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.path(), Some("/"));
    }
}
