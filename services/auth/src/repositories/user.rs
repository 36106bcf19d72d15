//! User repository for database operations
//!
//! Every write runs inside its own transaction. Dropping the transaction on
//! an error path rolls it back; only the success path commits.

use async_trait::async_trait;
use common::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use super::UserStore;
use crate::{
    models::{NewUser, User},
    password::PasswordCredentials,
};

const USER_COLUMNS: &str = "id, email, username, password_hash, password_salt, first_name, last_name, is_active, created_at";

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, predicate: &str, value: &str) -> DatabaseResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, predicate);
        sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        debug!("Finding user by ID: {}", id);

        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        debug!("Finding user by username: {}", username);
        self.find_one("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        debug!("Finding user by email: {}", email);
        self.find_one("email", email).await
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> DatabaseResult<Vec<User>> {
        debug!("Finding users by email {} or username {}", email, username);

        let sql = format!(
            "SELECT {} FROM users WHERE email = $1 OR username = $2 ORDER BY created_at",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(username)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        info!("Creating new user: {}", new_user.username);

        let mut tx = self.pool.begin().await.map_err(DatabaseError::Connection)?;
        let sql = format!(
            r#"
            INSERT INTO users (id, email, username, password_hash, password_salt, first_name, last_name, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_user.email)
            .bind(&new_user.username)
            .bind(&new_user.credentials.hash)
            .bind(&new_user.credentials.salt)
            .bind(&new_user.first_name)
            .bind(&new_user.last_name)
            .fetch_one(&mut *tx)
            .await
            .map_err(DatabaseError::from_query)?;
        tx.commit().await.map_err(DatabaseError::from_query)?;

        Ok(user)
    }

    async fn reactivate(&self, id: Uuid, new_user: &NewUser) -> DatabaseResult<Option<User>> {
        info!("Reactivating user {} as {}", id, new_user.username);

        let mut tx = self.pool.begin().await.map_err(DatabaseError::Connection)?;
        let sql = format!(
            r#"
            UPDATE users
            SET email = $2, username = $3, password_hash = $4, password_salt = $5,
                first_name = $6, last_name = $7, is_active = TRUE
            WHERE id = $1 AND is_active = FALSE
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&new_user.email)
            .bind(&new_user.username)
            .bind(&new_user.credentials.hash)
            .bind(&new_user.credentials.salt)
            .bind(&new_user.first_name)
            .bind(&new_user.last_name)
            .fetch_optional(&mut *tx)
            .await
            .map_err(DatabaseError::from_query)?;
        tx.commit().await.map_err(DatabaseError::from_query)?;

        Ok(user)
    }

    async fn update_password(
        &self,
        id: Uuid,
        credentials: &PasswordCredentials,
    ) -> DatabaseResult<bool> {
        info!("Updating password for user: {}", id);

        let mut tx = self.pool.begin().await.map_err(DatabaseError::Connection)?;
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, password_salt = $3 WHERE id = $1")
                .bind(id)
                .bind(&credentials.hash)
                .bind(&credentials.salt)
                .execute(&mut *tx)
                .await
                .map_err(DatabaseError::from_query)?;
        tx.commit().await.map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() == 1)
    }

    async fn deactivate(&self, id: Uuid) -> DatabaseResult<bool> {
        info!("Deactivating user: {}", id);

        let mut tx = self.pool.begin().await.map_err(DatabaseError::Connection)?;
        let result = sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1 AND is_active")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from_query)?;
        tx.commit().await.map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() == 1)
    }

    async fn health_check(&self) -> DatabaseResult<bool> {
        common::health_check(&self.pool).await
    }
}
