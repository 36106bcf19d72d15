//! Authentication service routes

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    AppState,
    error::{AuthError, AuthResult},
    middleware::AuthUser,
    models::UserProfile,
    service::{Registration, RegistrationOutcome},
};

/// Request for user login
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request for user registration
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

/// Request for a password reset link
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResetPasswordRequest {
    pub email: String,
}

/// Request for a password change
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Request for account deactivation
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeactivateAccountRequest {
    pub username: String,
    pub password: String,
}

/// Response for a successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

/// Response for a successful registration or reactivation
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserProfile,
}

/// Plain acknowledgement
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/logout", post(logout))
        .route("/reset-password", post(reset_password))
        .route("/change-password", post(change_password))
        .route("/deactivate-account", post(deactivate_account))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        let status = res.status();
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> AuthResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AuthError::Validation(rejection.body_text()))
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = if state.auth_service.store_healthy().await {
        "up"
    } else {
        "down"
    };

    Json(serde_json::json!({
        "status": "OK",
        "service": "auth-service",
        "database": database,
    }))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AuthResult<Json<LoginResponse>> {
    let payload = body(payload)?;
    info!("Login request received for user: {}", payload.username);

    let token = state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
    }))
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse> {
    let payload = body(payload)?;
    info!("Register request received for user: {}", payload.username);

    let outcome = state
        .auth_service
        .register(Registration {
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
            username: payload.username,
        })
        .await?;

    let (status, message) = match &outcome {
        RegistrationOutcome::Created(_) => (StatusCode::CREATED, "Registration successful"),
        RegistrationOutcome::Reactivated(_) => (StatusCode::OK, "Account reactivated"),
    };

    Ok((
        status,
        Json(RegisterResponse {
            message: message.to_string(),
            user: outcome.user().profile(),
        }),
    ))
}

/// Logout endpoint. Tokens are stateless, so there is nothing to revoke.
pub async fn logout() -> Json<MessageResponse> {
    info!("Logout request received");
    MessageResponse::new("Logout successful")
}

/// Password reset endpoint
pub async fn reset_password(
    State(state): State<AppState>,
    payload: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> AuthResult<Json<MessageResponse>> {
    let payload = body(payload)?;
    info!("Reset password request received");

    state.auth_service.reset_password(&payload.email).await?;
    Ok(MessageResponse::new("Password reset link sent to email"))
}

/// Password change endpoint, for the account named by the bearer token
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(account_id): AuthUser,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> AuthResult<Json<MessageResponse>> {
    let payload = body(payload)?;
    info!("Change password request received for user: {}", account_id);

    state
        .auth_service
        .change_password(account_id, &payload.old_password, &payload.new_password)
        .await?;
    Ok(MessageResponse::new("Password changed successfully"))
}

/// Account deactivation endpoint
pub async fn deactivate_account(
    State(state): State<AppState>,
    payload: Result<Json<DeactivateAccountRequest>, JsonRejection>,
) -> AuthResult<Json<MessageResponse>> {
    let payload = body(payload)?;
    info!("Deactivate account request received for user: {}", payload.username);

    state
        .auth_service
        .deactivate_account(&payload.username, &payload.password)
        .await?;
    Ok(MessageResponse::new("Account deactivated successfully"))
}
