//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required.".to_string());
    }

    if username.chars().count() < MIN_USERNAME_LENGTH {
        return Err(format!(
            "Username must be at least {} characters long.",
            MIN_USERNAME_LENGTH
        ));
    }

    if username.len() > 255 {
        return Err("Username must be at most 255 characters long.".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required.".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long.".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Not a valid email address.".to_string());
    }

    Ok(())
}

/// Validate password length; `field` names the password in messages
pub fn validate_password(field: &str, password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err(format!("{} is required.", field));
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "{} must be at least {} characters long.",
            field, MIN_PASSWORD_LENGTH
        ));
    }

    if password.len() > 128 {
        return Err(format!("{} must be at most 128 characters long.", field));
    }

    Ok(())
}

/// Validate a first or last name: letters only
pub fn validate_name(field: &str, name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err(format!("{} is required.", field));
    }

    static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex =
        NAME_REGEX.get_or_init(|| Regex::new(r"^[a-zA-Z]+$").expect("Failed to compile name regex"));

    if !regex.is_match(name) {
        return Err(format!("{} must contain only letters.", field));
    }

    Ok(())
}

/// Presence check for fields that carry no format rule
pub fn require(field: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{} is required.", field));
    }
    Ok(())
}
