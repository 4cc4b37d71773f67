mod helpers;

use axum::{
    body::Body,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_ORIGIN,
            ACCESS_CONTROL_REQUEST_METHOD, CONTENT_TYPE, COOKIE, ORIGIN, SET_COOKIE,
        },
        Method, Request, StatusCode,
    },
    Router,
};
use helpers::*;
use http_body_util::BodyExt;
use pokernight_backend::http::build_router;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;

type TestResult<T = ()> = anyhow::Result<T>;

/// Router over a pool that never connects. Good for every path that is
/// answered before the database is touched.
async fn offline_router() -> TestResult<Router> {
    let pool = PgPoolOptions::new().connect_lazy("postgres://localhost:1/unreachable")?;
    let db = TestDatabase::from_pool(pool).await;
    Ok(build_router(db.state))
}

async fn send(router: &Router, request: Request<Body>) -> TestResult<(StatusCode, Value)> {
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    Ok((status, body))
}

fn json_request(method: Method, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

// ============================================================================
// Offline router tests
// ============================================================================

#[tokio::test]
async fn health_returns_ok() -> TestResult {
    let router = offline_router().await?;
    let (status, body) = send(&router, get("/health", None)).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_cookie() -> TestResult {
    let router = offline_router().await?;

    for uri in [
        "/api/auth/me",
        "/api/sessions",
        "/api/users/me/stats",
        "/api/admin/users",
    ] {
        let (status, body) = send(&router, get(uri, None)).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["error"], "Not logged in");
    }

    let (status, _) = send(
        &router,
        json_request(
            Method::POST,
            "/api/sessions",
            None,
            json!({"name": "Game", "buy_in": "20"}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn register_validates_before_touching_database() -> TestResult {
    let router = offline_router().await?;

    let cases = [
        (json!({"name": "", "email": "a@example.com", "password": "longenough"}), "Name is required"),
        (json!({"name": "Al", "email": "not-an-email", "password": "longenough"}), "Invalid email address"),
        (json!({"name": "Al", "email": "a@example.com", "password": "short"}), "Password must be at least 8 characters"),
    ];

    for (payload, message) in cases {
        let (status, body) = send(
            &router,
            json_request(Method::POST, "/api/auth/register", None, payload),
        )
        .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], message);
    }
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_rejected() -> TestResult {
    let router = offline_router().await?;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))?;

    let response = router.oneshot(request).await?;
    assert!(response.status().is_client_error());
    Ok(())
}

#[tokio::test]
async fn cors_preflight_allows_frontend_origin() -> TestResult {
    let router = offline_router().await?;
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/sessions")
        .header(ORIGIN, "http://poker.test")
        .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())?;

    let response = router.oneshot(request).await?;
    let headers = response.headers();
    assert_eq!(
        headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).and_then(|v| v.to_str().ok()),
        Some("http://poker.test")
    );
    assert_eq!(
        headers.get(ACCESS_CONTROL_ALLOW_CREDENTIALS).and_then(|v| v.to_str().ok()),
        Some("true")
    );
    Ok(())
}

// ============================================================================
// Full HTTP flow (database-backed)
// ============================================================================

/// Register through the API and return the `name=value` cookie pair
async fn register(router: &Router, name: &str, email: &str) -> TestResult<String> {
    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/auth/register",
            None,
            json!({"name": name, "email": email, "password": TEST_PASSWORD}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| anyhow::anyhow!("missing Set-Cookie"))?;
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Path=/"));

    let pair = set_cookie
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();
    assert!(pair.starts_with("pokernight_session="));
    Ok(pair)
}

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn game_night_over_http(pool: PgPool) -> TestResult {
    let db = TestDatabase::from_pool(pool).await;
    let router = build_router(db.state);

    let host = register(&router, "Dana", "dana@example.com").await?;
    let alice = register(&router, "Alice", "alice@example.com").await?;

    let (status, me) = send(&router, get("/api/auth/me", Some(&alice))).await?;
    assert_eq!(status, StatusCode::OK);
    let alice_id = me["user"]["id"].as_str().unwrap_or_default().to_string();
    assert!(me["user"].get("password_hash").is_none());

    let (status, created) = send(
        &router,
        json_request(
            Method::POST,
            "/api/sessions",
            Some(&host),
            json!({"name": "Friday", "buy_in": "20.00", "location": "Kitchen"}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let session_id = created["session"]["id"].as_str().unwrap_or_default().to_string();
    assert_eq!(created["session"]["buy_in"], "20.00");
    assert_eq!(created["session"]["status"], "ONGOING");

    // The host seats Alice with the default buy-in
    let (status, seat) = send(
        &router,
        json_request(
            Method::POST,
            &format!("/api/sessions/{}/players", session_id),
            Some(&host),
            json!({"user_id": alice_id}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let player_id = seat["player"]["id"].as_str().unwrap_or_default().to_string();

    // Alice rebuys for herself
    let (status, rebuy) = send(
        &router,
        json_request(
            Method::POST,
            &format!("/api/sessions/{}/players/{}/rebuy", session_id, player_id),
            Some(&alice),
            json!({"amount": 10}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rebuy["player"]["stack"], "30.00");

    // Overdrawing the stack is a 400
    let (status, body) = send(
        &router,
        json_request(
            Method::POST,
            &format!("/api/sessions/{}/players/{}/cash-out", session_id, player_id),
            Some(&alice),
            json!({"amount": "31"}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("negative"));

    // Completing with an active player is a 400
    let (status, _) = send(
        &router,
        json_request(
            Method::POST,
            &format!("/api/sessions/{}/complete", session_id),
            Some(&host),
            json!({}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Alice cannot correct stacks
    let (status, _) = send(
        &router,
        json_request(
            Method::POST,
            &format!("/api/sessions/{}/players/{}/stack", session_id, player_id),
            Some(&alice),
            json!({"stack": "100"}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, cashed) = send(
        &router,
        json_request(
            Method::POST,
            &format!("/api/sessions/{}/players/{}/cash-out", session_id, player_id),
            Some(&alice),
            json!({}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cashed["player"]["status"], "CASHED_OUT");

    let (status, _) = send(
        &router,
        json_request(
            Method::POST,
            &format!("/api/sessions/{}/complete", session_id),
            Some(&host),
            json!({}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &router,
        get(&format!("/api/sessions/{}/settlement", session_id), Some(&host)),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, settlement) = send(
        &router,
        json_request(
            Method::POST,
            &format!("/api/sessions/{}/settlement", session_id),
            Some(&host),
            json!({"expenses": []}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settlement["settlements"].as_array().map(Vec::len), Some(1));
    assert_eq!(settlement["discrepancy"], "0.00");

    let (status, tx) = send(
        &router,
        get(&format!("/api/sessions/{}/transactions", session_id), Some(&alice)),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tx["transactions"].as_array().map(Vec::len), Some(3));

    // Non-admins are kept out of the admin area
    let (status, _) = send(&router, get("/api/admin/users", Some(&alice))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &router,
        json_request(Method::POST, "/api/auth/logout", Some(&alice), json!({})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&router, get("/api/auth/me", Some(&alice))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[sqlx::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn readiness_pings_database(pool: PgPool) -> TestResult {
    let db = TestDatabase::from_pool(pool).await;
    let router = build_router(db.state);

    let (status, body) = send(&router, get("/health/ready", None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    Ok(())
}
