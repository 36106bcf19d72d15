//! JWT service for token generation and validation
//!
//! Tokens are signed with HS256 (HMAC-SHA256) using a shared secret and carry
//! the account id, the issue time and an expiry one token lifetime later.
//! There is no refresh token, revocation list or key rotation.

use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::debug;
use uuid::Uuid;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Shared secret used to sign and verify tokens
    pub secret: String,
    /// Token lifetime in seconds (default: 1 hour)
    pub token_expiry: u64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("token_expiry", &self.token_expiry)
            .finish()
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Account ID
    pub sub: Uuid,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_expiry: u64,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: &JwtConfig) -> Result<Self> {
        if config.secret.is_empty() {
            anyhow::bail!("JWT secret must not be empty");
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(JwtService {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            token_expiry: config.token_expiry,
        })
    }

    /// Generate a signed token for an account
    pub fn generate_token(&self, account_id: Uuid) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        self.generate_token_at(account_id, now)
    }

    fn generate_token_at(&self, account_id: Uuid, issued_at: u64) -> Result<String> {
        let exp = issued_at
            .checked_add(self.token_expiry)
            .ok_or_else(|| anyhow::anyhow!("Token expiry overflows the timestamp range"))?;
        let claims = Claims {
            sub: account_id,
            iat: issued_at,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        debug!(account_id = %account_id, exp = claims.exp, "jwt signed");
        Ok(token)
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Token lifetime in seconds
    pub fn token_expiry(&self) -> u64 {
        self.token_expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> JwtService {
        JwtService::new(&JwtConfig {
            secret: secret.to_string(),
            token_expiry: 3600,
        })
        .expect("service should build")
    }

    #[test]
    fn token_round_trips_account_id_and_one_hour_expiry() {
        let jwt = service("test-secret");
        let account_id = Uuid::new_v4();

        let token = jwt.generate_token(account_id).expect("sign");
        let claims = jwt.validate_token(&token).expect("verify");

        assert_eq!(claims.sub, account_id);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_decodes_with_plain_jsonwebtoken_and_secret() {
        let jwt = service("shared");
        let account_id = Uuid::new_v4();
        let token = jwt.generate_token(account_id).unwrap();

        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"shared"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(data.header.alg, Algorithm::HS256);
        assert_eq!(data.claims.sub, account_id);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = service("secret-a").generate_token(Uuid::new_v4()).unwrap();
        assert!(service("secret-b").validate_token(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = service("test-secret");
        let token = jwt.generate_token_at(Uuid::new_v4(), 1_000).unwrap();
        assert!(jwt.validate_token(&token).is_err());
    }

    #[test]
    fn overflowing_expiry_is_an_error() {
        let jwt = JwtService::new(&JwtConfig {
            secret: "test-secret".to_string(),
            token_expiry: u64::MAX,
        })
        .unwrap();

        assert!(jwt.generate_token(Uuid::new_v4()).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(service("test-secret").validate_token("not.a.token").is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        let result = JwtService::new(&JwtConfig {
            secret: String::new(),
            token_expiry: 3600,
        });
        assert!(result.is_err());
    }

    #[test]
    fn debug_output_hides_secret() {
        let config = JwtConfig {
            secret: "hunter2".to_string(),
            token_expiry: 60,
        };
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
