//! End-to-end tests for the expends API.
//!
//! Drives the real router (same wiring as the binary) against the in-memory
//! store, exercising the credential lifecycle and the statement ledger the
//! way a client would: JSON bodies in, envelope bodies and cookies out.

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use expends::{
    expends::handlers::auth::{AuthConfig, AuthState},
    expends::router,
    store::{memory::MemoryStore, SharedStore},
};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> Router {
    let config = AuthConfig::new(
        SecretString::from("test-access-secret".to_string()),
        SecretString::from("test-refresh-secret".to_string()),
    )
    .with_secure_cookies(false);
    let auth_state = Arc::new(AuthState::new(config).expect("distinct secrets"));
    let store: SharedStore = Arc::new(MemoryStore::new());
    router(auth_state, store)
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

async fn register(app: &Router, username: &str, email: &str, password: &str) -> Result<StatusCode> {
    let (status, _) = send(
        app,
        "POST",
        "/register",
        None,
        Some(json!({"username": username, "email": email, "password": password})),
    )
    .await?;
    Ok(status)
}

/// Log in and return `(access_token, refresh_token)` from the body.
async fn login(app: &Router, identifier: &str, password: &str) -> Result<(String, String)> {
    let (status, body) = send(
        app,
        "POST",
        "/login",
        None,
        Some(json!({"username": identifier, "password": password})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    let access = body["data"]["accessToken"]
        .as_str()
        .context("missing access token")?
        .to_string();
    let refresh = body["data"]["refreshToken"]
        .as_str()
        .context("missing refresh token")?
        .to_string();
    Ok((access, refresh))
}

async fn create_statement(
    app: &Router,
    access: &str,
    name: &str,
    amount: f64,
    kind: &str,
) -> Result<(StatusCode, Value)> {
    send(
        app,
        "POST",
        "/create-statement",
        Some(access),
        Some(json!({"name": name, "amount": amount, "type": kind})),
    )
    .await
}

#[tokio::test]
async fn health_reports_store_status() -> Result<()> {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "expends");
    assert_eq!(body["store"], "ok");
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_conflicts_any_casing() -> Result<()> {
    let app = test_app();
    assert_eq!(
        register(&app, "alice", "alice@x.com", "secret1").await?,
        StatusCode::CREATED
    );

    // Same username, different casing and email.
    assert_eq!(
        register(&app, "ALICE", "other@x.com", "secret1").await?,
        StatusCode::CONFLICT
    );
    // Same email, different username.
    assert_eq!(
        register(&app, "bob", "alice@x.com", "secret1").await?,
        StatusCode::CONFLICT
    );

    // The first record is unaffected: login still works.
    login(&app, "alice", "secret1").await?;
    Ok(())
}

#[tokio::test]
async fn register_rejects_blank_fields_and_bad_email() -> Result<()> {
    let app = test_app();
    assert_eq!(
        register(&app, "   ", "alice@x.com", "secret1").await?,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        register(&app, "alice", "alice@x.com", "  ").await?,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        register(&app, "alice", "not-an-email", "secret1").await?,
        StatusCode::BAD_REQUEST
    );
    Ok(())
}

#[tokio::test]
async fn registration_response_never_leaks_credentials() -> Result<()> {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({"username": "Alice", "email": "Alice@X.com", "password": "secret1"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    // Username and email are stored normalized.
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["email"], "alice@x.com");
    let rendered = body.to_string();
    assert!(!rendered.contains("password"));
    assert!(!rendered.contains("digest"));
    Ok(())
}

#[tokio::test]
async fn login_with_wrong_password_fails_auth() -> Result<()> {
    let app = test_app();
    register(&app, "alice", "alice@x.com", "secret1").await?;

    let (status, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"username": "alice", "password": "wrong"})),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    // The message must not confirm the username exists.
    assert_eq!(body["message"], "Invalid credentials.");
    Ok(())
}

#[tokio::test]
async fn login_accepts_email_as_identifier() -> Result<()> {
    let app = test_app();
    register(&app, "alice", "alice@x.com", "secret1").await?;

    let (status, _) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"email": "alice@x.com", "password": "secret1"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn login_sets_both_token_cookies() -> Result<()> {
    let app = test_app();
    register(&app, "alice", "alice@x.com", "secret1").await?;

    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"username": "alice", "password": "secret1"}).to_string(),
        ))?;
    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies: Vec<_> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect();
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().any(|c| c.starts_with("accessToken=")));
    assert!(cookies.iter().any(|c| c.starts_with("refreshToken=")));
    assert!(cookies.iter().all(|c| c.contains("HttpOnly")));
    Ok(())
}

#[tokio::test]
async fn refresh_rotation_rejects_the_previous_token() -> Result<()> {
    let app = test_app();
    register(&app, "alice", "alice@x.com", "secret1").await?;
    let (_, old_refresh) = login(&app, "alice", "secret1").await?;

    // First refresh succeeds and returns a new pair.
    let (status, body) = send(
        &app,
        "POST",
        "/refresh-token",
        None,
        Some(json!({"refreshToken": old_refresh})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let new_refresh = body["data"]["refreshToken"]
        .as_str()
        .context("missing rotated token")?
        .to_string();
    assert_ne!(new_refresh, old_refresh);

    // Replaying the superseded token is rejected as stale.
    let (status, body) = send(
        &app,
        "POST",
        "/refresh-token",
        None,
        Some(json!({"refreshToken": old_refresh})),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "stale or already-used token");

    // The rotated token still works.
    let (status, _) = send(
        &app,
        "POST",
        "/refresh-token",
        None,
        Some(json!({"refreshToken": new_refresh})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn refresh_without_credential_is_unauthorized() -> Result<()> {
    let app = test_app();
    let (status, body) = send(&app, "POST", "/refresh-token", None, Some(json!({}))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "missing credential");
    Ok(())
}

#[tokio::test]
async fn refresh_accepts_the_cookie_transport() -> Result<()> {
    let app = test_app();
    register(&app, "alice", "alice@x.com", "secret1").await?;
    let (_, refresh) = login(&app, "alice", "secret1").await?;

    let request = Request::builder()
        .method("POST")
        .uri("/refresh-token")
        .header(header::COOKIE, format!("refreshToken={refresh}"))
        .body(Body::empty())?;
    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn logout_permanently_invalidates_the_refresh_token() -> Result<()> {
    let app = test_app();
    register(&app, "alice", "alice@x.com", "secret1").await?;
    let (access, refresh) = login(&app, "alice", "secret1").await?;

    let (status, _) = send(&app, "POST", "/logout", Some(&access), None).await?;
    assert_eq!(status, StatusCode::OK);

    // The cleared slot never matches again, no matter how often it is tried.
    for _ in 0..2 {
        let (status, body) = send(
            &app,
            "POST",
            "/refresh-token",
            None,
            Some(json!({"refreshToken": refresh})),
        )
        .await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "stale or already-used token");
    }

    // Next login issues a fresh working session.
    let (_, refresh) = login(&app, "alice", "secret1").await?;
    let (status, _) = send(
        &app,
        "POST",
        "/refresh-token",
        None,
        Some(json!({"refreshToken": refresh})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn logout_clears_both_cookies() -> Result<()> {
    let app = test_app();
    register(&app, "alice", "alice@x.com", "secret1").await?;
    let (access, _) = login(&app, "alice", "secret1").await?;

    let request = Request::builder()
        .method("POST")
        .uri("/logout")
        .header(header::AUTHORIZATION, format!("Bearer {access}"))
        .body(Body::empty())?;
    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies: Vec<_> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect();
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_credential() -> Result<()> {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/get-all-statements", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "missing credential");

    let (status, _) = send(&app, "GET", "/get-all-statements", Some("garbage"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn statement_lifecycle_end_to_end() -> Result<()> {
    let app = test_app();
    assert_eq!(
        register(&app, "alice", "alice@x.com", "secret1").await?,
        StatusCode::CREATED
    );
    let (access, _refresh) = login(&app, "alice", "secret1").await?;

    let (status, body) = create_statement(&app, &access, "Coffee", 5.0, "Expend").await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().context("missing id")?.to_string();
    assert_eq!(body["data"]["name"], "Coffee");
    assert_eq!(body["data"]["amount"], 5.0);
    assert_eq!(body["data"]["type"], "Expend");

    // The list contains exactly that entry.
    let (status, body) = send(&app, "GET", "/get-all-statements", Some(&access), None).await?;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"].as_array().context("expected array")?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], id.as_str());

    // Single fetch carries the formatted date/time projection.
    let (status, body) =
        send(&app, "GET", &format!("/get-statement/{id}"), Some(&access), None).await?;
    assert_eq!(status, StatusCode::OK);
    let date = body["data"]["date"].as_str().context("missing date")?;
    let time = body["data"]["time"].as_str().context("missing time")?;
    assert_eq!(date.len(), 10);
    assert_eq!(time.len(), 8);

    // Delete, then the list is empty again.
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/delete-statement/{id}"),
        Some(&access),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/get-all-statements", Some(&access), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().context("expected array")?.is_empty());

    let (status, _) =
        send(&app, "GET", &format!("/get-statement/{id}"), Some(&access), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn invalid_statement_kind_persists_nothing() -> Result<()> {
    let app = test_app();
    register(&app, "alice", "alice@x.com", "secret1").await?;
    let (access, _) = login(&app, "alice", "secret1").await?;

    let (status, _) = create_statement(&app, &access, "Nest egg", 100.0, "Savings").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, "GET", "/get-all-statements", Some(&access), None).await?;
    assert!(body["data"].as_array().context("expected array")?.is_empty());
    Ok(())
}

#[tokio::test]
async fn create_statement_requires_every_field() -> Result<()> {
    let app = test_app();
    register(&app, "alice", "alice@x.com", "secret1").await?;
    let (access, _) = login(&app, "alice", "secret1").await?;

    for body in [
        json!({"amount": 5.0, "type": "Expend"}),
        json!({"name": "Coffee", "type": "Expend"}),
        json!({"name": "Coffee", "amount": 5.0}),
    ] {
        let (status, _) =
            send(&app, "POST", "/create-statement", Some(&access), Some(body)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    Ok(())
}

#[tokio::test]
async fn update_statement_applies_partial_changes() -> Result<()> {
    let app = test_app();
    register(&app, "alice", "alice@x.com", "secret1").await?;
    let (access, _) = login(&app, "alice", "secret1").await?;

    let (_, body) = create_statement(&app, &access, "Coffee", 5.0, "Expend").await?;
    let id = body["data"]["id"].as_str().context("missing id")?.to_string();

    let (status, body) = send(
        &app,
        "PATCH",
        "/update-statement",
        Some(&access),
        Some(json!({"id": id, "amount": 7.5})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Coffee");
    assert_eq!(body["data"]["amount"], 7.5);
    assert_eq!(body["data"]["type"], "Expend");

    // Invalid kind on update is rejected.
    let (status, _) = send(
        &app,
        "PATCH",
        "/update-statement",
        Some(&access),
        Some(json!({"id": id, "type": "Savings"})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Missing id is a validation failure, not a lookup failure.
    let (status, _) = send(
        &app,
        "PATCH",
        "/update-statement",
        Some(&access),
        Some(json!({"amount": 1.0})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn statements_are_invisible_across_users() -> Result<()> {
    let app = test_app();
    register(&app, "alice", "alice@x.com", "secret1").await?;
    register(&app, "bob", "bob@x.com", "secret2").await?;
    let (alice, _) = login(&app, "alice", "secret1").await?;
    let (bob, _) = login(&app, "bob", "secret2").await?;

    let (_, body) = create_statement(&app, &alice, "Coffee", 5.0, "Expend").await?;
    let id = body["data"]["id"].as_str().context("missing id")?.to_string();

    // Bob cannot read, update, or delete Alice's statement.
    let (status, _) = send(&app, "GET", &format!("/get-statement/{id}"), Some(&bob), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(
        &app,
        "PATCH",
        "/update-statement",
        Some(&bob),
        Some(json!({"id": id, "amount": 0.0})),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/delete-statement/{id}"),
        Some(&bob),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Bob's own list stays empty; Alice still owns her statement.
    let (_, body) = send(&app, "GET", "/get-all-statements", Some(&bob), None).await?;
    assert!(body["data"].as_array().context("expected array")?.is_empty());
    let (status, _) =
        send(&app, "GET", &format!("/get-statement/{id}"), Some(&alice), None).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn malformed_statement_id_is_a_validation_error() -> Result<()> {
    let app = test_app();
    register(&app, "alice", "alice@x.com", "secret1").await?;
    let (access, _) = login(&app, "alice", "secret1").await?;

    let (status, _) =
        send(&app, "GET", "/get-statement/not-a-uuid", Some(&access), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn error_envelope_has_the_uniform_shape() -> Result<()> {
    let app = test_app();
    let (status, body) = send(&app, "POST", "/login", None, Some(json!({}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["message"].is_string());
    assert!(body["errors"].is_array());
    Ok(())
}
