mod common;

use axum::http::{Method, StatusCode};
use common::spawn_app;
use serde_json::json;

#[tokio::test]
async fn signup_creates_user_and_returns_token() {
    let app = spawn_app();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({"email": "new@example.com", "password": "testpass"})),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    let token = body["token"].as_str().unwrap();
    assert_eq!(token.len(), 64);

    // The token works against a protected route
    let (status, _) = app.request(Method::GET, "/api/tags", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn signup_normalizes_email() {
    let app = spawn_app();

    let (status, _) = app
        .request(
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({"email": "Mixed@CASE.com", "password": "testpass"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Login matches case-insensitively against the stored lowercase email
    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "mixed@case.COM", "password": "testpass"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn signup_rejects_blank_email() {
    let app = spawn_app();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({"email": "   ", "password": "testpass"})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["email"].is_array());
}

#[tokio::test]
async fn signup_rejects_duplicate_email() {
    let app = spawn_app();
    app.user_with_token("taken@example.com");

    let (status, _) = app
        .request(
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({"email": "Taken@example.com", "password": "other"})),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_rejects_bad_password() {
    let app = spawn_app();
    app.user_with_token("user@example.com");

    let (status, _) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "user@example.com", "password": "wrong"})),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = spawn_app();

    for uri in [
        "/api/tags",
        "/api/ingredients",
        "/api/recipes",
        "/api/posts",
    ] {
        let (status, body) = app.request(Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "GET {} without token", uri);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn non_bearer_authorization_is_rejected() {
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    let app = spawn_app();
    let (_, token) = app.user_with_token("user@example.com");

    // A valid token under the wrong scheme must not authenticate
    for value in [format!("Token {}", token), token.clone(), "Bearer".to_string()] {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/recipes")
            .header(header::AUTHORIZATION, &value)
            .body(Body::empty())
            .unwrap();

        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "Authorization: {:?}",
            value
        );
    }
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let app = spawn_app();

    let (status, _) = app
        .request(Method::GET, "/api/recipes", Some("deadbeef"), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
