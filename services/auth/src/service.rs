//! Account flows: registration, login, deactivation and password changes
//!
//! Handlers stay thin; every rule about account state lives here. Storage is
//! reached through [`UserStore`] so the flows run the same against
//! PostgreSQL and the in-memory store.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    error::{AuthError, AuthResult},
    jwt::JwtService,
    models::{NewUser, User},
    password::{hash_password, verify_password},
    repositories::UserStore,
    validation,
};

/// Registration input as received from the client
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

/// What registration did to the store
#[derive(Debug, Clone)]
pub enum RegistrationOutcome {
    /// A new account was inserted
    Created(User),
    /// An inactive account was overwritten and switched back on
    Reactivated(User),
}

impl RegistrationOutcome {
    pub fn user(&self) -> &User {
        match self {
            RegistrationOutcome::Created(user) | RegistrationOutcome::Reactivated(user) => user,
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, jwt: JwtService) -> Self {
        Self { store, jwt }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Register a new account or reactivate a matching inactive one
    pub async fn register(&self, input: Registration) -> AuthResult<RegistrationOutcome> {
        let email = input.email.trim().to_lowercase();
        let username = input.username.trim().to_string();
        let first_name = input.first_name.trim().to_string();
        let last_name = input.last_name.trim().to_string();

        validation::validate_email(&email)
            .and_then(|_| validation::validate_password("Password", &input.password))
            .and_then(|_| validation::validate_name("First name", &first_name))
            .and_then(|_| validation::validate_name("Last name", &last_name))
            .and_then(|_| validation::validate_username(&username))
            .map_err(|msg| {
                warn!(reason = %msg, "registration rejected");
                AuthError::Validation(msg)
            })?;

        let existing = self.store.find_by_email_or_username(&email, &username).await?;
        if existing.iter().any(|u| u.is_active) {
            warn!(%email, %username, "registration for an identity already in use");
            return Err(AuthError::Conflict(
                "Email or username is already in use".to_string(),
            ));
        }
        if existing.len() > 1 {
            warn!(%email, %username, "email and username belong to different inactive accounts");
            return Err(AuthError::Conflict(
                "Email and username belong to different accounts".to_string(),
            ));
        }

        let new_user = NewUser {
            email,
            username,
            credentials: hash_password(&input.password)?,
            first_name,
            last_name,
        };

        match existing.first() {
            Some(inactive) => {
                let user = self
                    .store
                    .reactivate(inactive.id, &new_user)
                    .await?
                    .ok_or_else(|| {
                        AuthError::Conflict("Email or username is already in use".to_string())
                    })?;
                info!(user_id = %user.id, username = %user.username, "account reactivated");
                Ok(RegistrationOutcome::Reactivated(user))
            }
            None => {
                let user = self.store.create(&new_user).await?;
                info!(user_id = %user.id, username = %user.username, "user registered");
                Ok(RegistrationOutcome::Created(user))
            }
        }
    }

    /// Check credentials and issue a signed token
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<String> {
        let username = username.trim();
        validation::require("Username", username)
            .and_then(|_| validation::require("Password", password))
            .map_err(AuthError::Validation)?;

        let Some(user) = self.store.find_by_username(username).await? else {
            warn!(%username, "login for unknown username");
            return Err(AuthError::invalid_credentials());
        };

        if !user.is_active {
            warn!(user_id = %user.id, "login for inactive account");
            return Err(AuthError::Authorization);
        }

        if !verify_password(password, &user.password_hash, &user.password_salt)? {
            warn!(user_id = %user.id, "login with invalid password");
            return Err(AuthError::invalid_credentials());
        }

        let token = self.jwt.generate_token(user.id).map_err(|e| {
            error!(user_id = %user.id, "Failed to generate token: {}", e);
            AuthError::Unexpected(e)
        })?;

        info!(user_id = %user.id, "user logged in");
        Ok(token)
    }

    /// Deactivate an account after checking its credentials
    pub async fn deactivate_account(&self, username: &str, password: &str) -> AuthResult<()> {
        let username = username.trim();
        validation::require("Username", username)
            .and_then(|_| validation::require("Password", password))
            .map_err(AuthError::Validation)?;

        let Some(user) = self.store.find_by_username(username).await? else {
            warn!(%username, "deactivation for unknown username");
            return Err(AuthError::invalid_credentials());
        };

        if !verify_password(password, &user.password_hash, &user.password_salt)? {
            warn!(user_id = %user.id, "deactivation with invalid password");
            return Err(AuthError::invalid_credentials());
        }

        if !user.is_active || !self.store.deactivate(user.id).await? {
            warn!(user_id = %user.id, "account already inactive");
            return Err(AuthError::AlreadyInactive);
        }

        info!(user_id = %user.id, "account deactivated");
        Ok(())
    }

    /// Replace the password of the account the token was issued for
    pub async fn change_password(
        &self,
        account_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        validation::require("Old password", old_password)
            .and_then(|_| validation::validate_password("New password", new_password))
            .map_err(AuthError::Validation)?;

        let Some(user) = self.store.find_by_id(account_id).await? else {
            warn!(user_id = %account_id, "password change for missing account");
            return Err(AuthError::invalid_credentials());
        };

        if !user.is_active {
            warn!(user_id = %user.id, "password change for inactive account");
            return Err(AuthError::Authorization);
        }

        if !verify_password(old_password, &user.password_hash, &user.password_salt)? {
            warn!(user_id = %user.id, "password change with invalid old password");
            return Err(AuthError::Authentication("Invalid old password".to_string()));
        }

        let credentials = hash_password(new_password)?;
        if !self.store.update_password(user.id, &credentials).await? {
            return Err(AuthError::invalid_credentials());
        }

        info!(user_id = %user.id, "password changed");
        Ok(())
    }

    /// Accept a reset request. No mail is sent; the outcome never reveals
    /// whether the address is registered.
    pub async fn reset_password(&self, email: &str) -> AuthResult<()> {
        let email = email.trim().to_lowercase();
        validation::validate_email(&email).map_err(AuthError::Validation)?;

        match self.store.find_by_email(&email).await? {
            Some(user) => info!(user_id = %user.id, "password reset requested"),
            None => info!("password reset requested for unknown email"),
        }
        Ok(())
    }

    /// Whether the backing store answers
    pub async fn store_healthy(&self) -> bool {
        match self.store.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                error!(error = %e, "store health check failed");
                false
            }
        }
    }
}
