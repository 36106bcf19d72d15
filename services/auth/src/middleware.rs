//! Bearer token extraction for routes that act on the caller's own account

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::warn;
use uuid::Uuid;

use crate::{AppState, error::AuthError};

/// Account id taken from a valid `Authorization: Bearer <jwt>` header
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AuthError::Authentication("Missing or invalid Authorization header".to_string())
                })?;

        let claims = state
            .auth_service
            .jwt()
            .validate_token(bearer.token())
            .map_err(|e| {
                warn!("Failed to validate token: {}", e);
                AuthError::Authentication("Invalid or expired token".to_string())
            })?;

        Ok(AuthUser(claims.sub))
    }
}
