//! HTTP-level tests of the authentication routes over the in-memory store

use std::sync::Arc;

use auth::{
    AppState,
    jwt::{JwtConfig, JwtService},
    repositories::MemoryUserStore,
    routes::create_router,
    service::AuthService,
};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    let jwt = JwtService::new(&JwtConfig {
        secret: "api-test-secret".to_string(),
        token_expiry: 3600,
    })
    .unwrap();
    let service = AuthService::new(Arc::new(MemoryUserStore::new()), jwt);
    create_router(AppState::new(service))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_with_token(uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn registration(email: &str, username: &str, password: &str) -> Value {
    json!({
        "email": email,
        "password": password,
        "first_name": "A",
        "last_name": "B",
        "username": username,
    })
}

async fn login_token(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        post("/login", json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_login_and_reject_wrong_password() {
    let app = app();

    let (status, body) = send(&app, post("/register", registration("a@b.com", "ab1", "secret1"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Registration successful");
    assert_eq!(body["user"]["username"], "ab1");
    assert_eq!(body["user"]["is_active"], true);
    assert!(body["user"].get("password_hash").is_none());

    let token = login_token(&app, "ab1", "secret1").await;
    assert!(!token.is_empty());

    let (status, body) = send(
        &app,
        post("/login", json!({ "username": "ab1", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid username or password");
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = app();
    send(&app, post("/register", registration("a@b.com", "ab1", "secret1"))).await;

    let (status, body) = send(&app, post("/register", registration("a@b.com", "zz9", "secret1"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn registration_validation_errors() {
    let app = app();

    let (status, body) = send(&app, post("/register", registration("nope", "ab1", "secret1"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Not a valid email address.");

    let (status, body) = send(&app, post("/register", json!({ "email": "a@b.com" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn deactivate_then_login_is_forbidden_and_reregistration_reactivates() {
    let app = app();
    let (_, created) = send(&app, post("/register", registration("a@b.com", "ab1", "secret1"))).await;

    let deactivate = json!({ "username": "ab1", "password": "secret1" });
    let (status, body) = send(&app, post("/deactivate-account", deactivate.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Account deactivated successfully");

    let (status, body) = send(&app, post("/deactivate-account", deactivate)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Account is already inactive");

    let (status, body) = send(
        &app,
        post("/login", json!({ "username": "ab1", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Account is inactive");

    let (status, body) = send(&app, post("/register", registration("a@b.com", "ab1", "fresh12"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Account reactivated");
    assert_eq!(body["user"]["id"], created["user"]["id"]);

    login_token(&app, "ab1", "fresh12").await;
}

#[tokio::test]
async fn deactivate_with_wrong_password_is_unauthorized() {
    let app = app();
    send(&app, post("/register", registration("a@b.com", "ab1", "secret1"))).await;

    let (status, _) = send(
        &app,
        post("/deactivate-account", json!({ "username": "ab1", "password": "nope12" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn change_password_requires_bearer_token() {
    let app = app();
    send(&app, post("/register", registration("a@b.com", "ab1", "secret1"))).await;
    let change = json!({ "old_password": "secret1", "new_password": "newpass1" });

    let (status, body) = send(&app, post("/change-password", change.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing or invalid Authorization header");

    let (status, body) = send(&app, post_with_token("/change-password", "garbage", change.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");

    let token = login_token(&app, "ab1", "secret1").await;
    let (status, body) = send(&app, post_with_token("/change-password", &token, change)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password changed successfully");

    login_token(&app, "ab1", "newpass1").await;
}

#[tokio::test]
async fn change_password_with_wrong_old_password_is_unauthorized() {
    let app = app();
    send(&app, post("/register", registration("a@b.com", "ab1", "secret1"))).await;
    let token = login_token(&app, "ab1", "secret1").await;

    let (status, body) = send(
        &app,
        post_with_token(
            "/change-password",
            &token,
            json!({ "old_password": "password123", "new_password": "newpass1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid old password");
}

#[tokio::test]
async fn reset_password_does_not_reveal_registration() {
    let app = app();

    let (status, body) = send(&app, post("/reset-password", json!({ "email": "unknown@b.com" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password reset link sent to email");

    let (status, _) = send(&app, post("/reset-password", json!({ "email": "bogus" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_always_succeeds() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/logout")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logout successful");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn health_reports_store_status() {
    let app = app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["service"], "auth-service");
    assert_eq!(body["database"], "up");
}
