//! Salted password hashing
//!
//! The salt and the raw hash output are stored in separate columns. Verifying
//! a password recomputes the hash with the stored salt and compares the two
//! outputs; `argon2::password_hash::Output` compares in constant time.

use anyhow::Result;
use argon2::{
    Argon2, PasswordHasher,
    password_hash::{Output, SaltString},
};
use std::fmt;
use tracing::error;

/// Hash and salt that are always written together
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordCredentials {
    /// Base64 hash output
    pub hash: String,
    /// Base64 salt used to produce `hash`
    pub salt: String,
}

impl fmt::Debug for PasswordCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordCredentials(<redacted>)")
    }
}

/// Hash a plaintext password with a freshly generated salt
pub fn hash_password(plain: &str) -> Result<PasswordCredentials> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let output = compute(plain, &salt)?;

    Ok(PasswordCredentials {
        hash: output.to_string(),
        salt: salt.as_str().to_string(),
    })
}

/// Check a plaintext password against a stored hash and salt
///
/// Returns `Ok(false)` on mismatch; errors only when the stored values
/// cannot be decoded.
pub fn verify_password(plain: &str, stored_hash: &str, stored_salt: &str) -> Result<bool> {
    let salt = SaltString::from_b64(stored_salt).map_err(|e| {
        error!(error = %e, "stored password salt is malformed");
        anyhow::anyhow!("Failed to parse password salt: {}", e)
    })?;
    let expected = Output::b64_decode(stored_hash).map_err(|e| {
        error!(error = %e, "stored password hash is malformed");
        anyhow::anyhow!("Failed to parse password hash: {}", e)
    })?;

    let actual = compute(plain, &salt)?;
    Ok(actual == expected)
}

fn compute(plain: &str, salt: &SaltString) -> Result<Output> {
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    hash.hash
        .ok_or_else(|| anyhow::anyhow!("Password hasher returned no output"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let credentials = hash_password("secret1").expect("hashing should succeed");
        assert!(verify_password("secret1", &credentials.hash, &credentials.salt).unwrap());
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let credentials = hash_password("correct-horse").unwrap();
        assert!(!verify_password("wrong", &credentials.hash, &credentials.salt).unwrap());
    }

    #[test]
    fn verify_rejects_hash_paired_with_another_salt() {
        let first = hash_password("same-password").unwrap();
        let second = hash_password("same-password").unwrap();

        assert_ne!(first.salt, second.salt);
        assert_ne!(first.hash, second.hash);
        assert!(!verify_password("same-password", &first.hash, &second.salt).unwrap());
    }

    #[test]
    fn verify_errors_on_malformed_storage() {
        let credentials = hash_password("anything").unwrap();
        assert!(verify_password("anything", "not base64!", &credentials.salt).is_err());
        assert!(verify_password("anything", &credentials.hash, "$$").is_err());
    }
}
