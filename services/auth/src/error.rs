//! Error taxonomy of the authentication service and its HTTP mapping

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Custom error type for authentication flows
#[derive(Error, Debug)]
pub enum AuthError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    /// Bad credentials or bad token
    #[error("{0}")]
    Authentication(String),

    /// The account exists but is inactive
    #[error("Account is inactive")]
    Authorization,

    /// Email or username already belongs to an active account
    #[error("{0}")]
    Conflict(String),

    /// Deactivation requested for an account that is already inactive
    #[error("Account is already inactive")]
    AlreadyInactive,

    /// Persistence failure
    #[error("Database error: {0}")]
    Storage(#[source] DatabaseError),

    /// Anything else, e.g. hashing or token signing failures
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl AuthError {
    pub fn invalid_credentials() -> Self {
        AuthError::Authentication(INVALID_CREDENTIALS.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) | AuthError::Conflict(_) | AuthError::AlreadyInactive => {
                StatusCode::BAD_REQUEST
            }
            AuthError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AuthError::Authorization => StatusCode::FORBIDDEN,
            AuthError::Storage(_) | AuthError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DatabaseError> for AuthError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UniqueViolation(_) => {
                AuthError::Conflict("Email or username is already in use".to_string())
            }
            other => AuthError::Storage(other),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AuthError::Storage(e) => {
                error!(error = %e, "storage failure while handling request");
                "Database error occurred".to_string()
            }
            AuthError::Unexpected(e) => {
                error!(error = ?e, "unexpected failure while handling request");
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for authentication results
pub type AuthResult<T> = Result<T, AuthError>;
