//! Common library for the authentication workspace
//!
//! This crate provides the storage plumbing shared by the services: PostgreSQL
//! pool configuration, migrations, health checks and the storage error type.

pub mod database;
pub mod error;

pub use database::{DatabaseConfig, health_check, init_pool, parse_database_url, run_migrations};
pub use error::{DatabaseError, DatabaseResult};
