//! Account authentication service
//!
//! Registration, login, deactivation and password management over a single
//! `users` table, with salted password hashes and HS256 session tokens.

pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repositories;
pub mod routes;
pub mod service;
pub mod validation;

use sqlx::migrate::Migrator;

use crate::service::AuthService;

/// Embedded schema migrations for the `users` table
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
}

impl AppState {
    pub fn new(auth_service: AuthService) -> Self {
        Self { auth_service }
    }
}
