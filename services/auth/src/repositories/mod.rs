//! Account storage
//!
//! [`UserStore`] is the seam between the account flows and persistence.
//! [`UserRepository`] backs it with PostgreSQL. With the `test-util` feature,
//! `MemoryUserStore` keeps the same uniqueness rules in process for tests.

use async_trait::async_trait;
use common::DatabaseResult;
use uuid::Uuid;

use crate::{
    models::{NewUser, User},
    password::PasswordCredentials,
};

#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod user;

#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryUserStore;
pub use user::UserRepository;

/// Persistence operations needed by the account flows
///
/// Writes that would break the email/username uniqueness rule fail with
/// `DatabaseError::UniqueViolation`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    /// Every account whose email or username matches, at most two rows
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> DatabaseResult<Vec<User>>;

    /// Insert a new active account
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User>;

    /// Overwrite an inactive account with `new_user` and mark it active.
    /// Returns `None` when the account is missing or already active.
    async fn reactivate(&self, id: Uuid, new_user: &NewUser) -> DatabaseResult<Option<User>>;

    /// Replace hash and salt together. Returns false when the account is missing.
    async fn update_password(&self, id: Uuid, credentials: &PasswordCredentials)
    -> DatabaseResult<bool>;

    /// Mark an active account inactive. Returns false when it was not active.
    async fn deactivate(&self, id: Uuid) -> DatabaseResult<bool>;

    async fn health_check(&self) -> DatabaseResult<bool>;
}
