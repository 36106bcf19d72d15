//! In-process user store
//!
//! Mirrors the `users` table constraints: email and username are unique
//! across active and inactive rows, and the conditional updates behave like
//! their SQL counterparts.

use async_trait::async_trait;
use chrono::Utc;
use common::{DatabaseError, DatabaseResult};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::UserStore;
use crate::{
    models::{NewUser, User},
    password::PasswordCredentials,
};

#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts, active or not
    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.lock().await.is_empty()
    }
}

fn check_unique(
    users: &HashMap<Uuid, User>,
    skip: Option<Uuid>,
    email: &str,
    username: &str,
) -> DatabaseResult<()> {
    for user in users.values().filter(|u| Some(u.id) != skip) {
        if user.email == email {
            return Err(DatabaseError::UniqueViolation("users_email_key".to_string()));
        }
        if user.username == username {
            return Err(DatabaseError::UniqueViolation("users_username_key".to_string()));
        }
    }
    Ok(())
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        Ok(self.users.lock().await.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> DatabaseResult<Vec<User>> {
        let users = self.users.lock().await;
        let mut matches: Vec<User> = users
            .values()
            .filter(|u| u.email == email || u.username == username)
            .cloned()
            .collect();
        matches.sort_by_key(|u| u.created_at);
        Ok(matches)
    }

    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        let mut users = self.users.lock().await;
        check_unique(&users, None, &new_user.email, &new_user.username)?;

        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email.clone(),
            username: new_user.username.clone(),
            password_hash: new_user.credentials.hash.clone(),
            password_salt: new_user.credentials.salt.clone(),
            first_name: Some(new_user.first_name.clone()),
            last_name: Some(new_user.last_name.clone()),
            is_active: true,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn reactivate(&self, id: Uuid, new_user: &NewUser) -> DatabaseResult<Option<User>> {
        let mut users = self.users.lock().await;
        if !users.get(&id).is_some_and(|u| !u.is_active) {
            return Ok(None);
        }
        check_unique(&users, Some(id), &new_user.email, &new_user.username)?;

        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };
        user.email = new_user.email.clone();
        user.username = new_user.username.clone();
        user.password_hash = new_user.credentials.hash.clone();
        user.password_salt = new_user.credentials.salt.clone();
        user.first_name = Some(new_user.first_name.clone());
        user.last_name = Some(new_user.last_name.clone());
        user.is_active = true;
        Ok(Some(user.clone()))
    }

    async fn update_password(
        &self,
        id: Uuid,
        credentials: &PasswordCredentials,
    ) -> DatabaseResult<bool> {
        let mut users = self.users.lock().await;
        match users.get_mut(&id) {
            Some(user) => {
                user.password_hash = credentials.hash.clone();
                user.password_salt = credentials.salt.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn deactivate(&self, id: Uuid) -> DatabaseResult<bool> {
        let mut users = self.users.lock().await;
        match users.get_mut(&id) {
            Some(user) if user.is_active => {
                user.is_active = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn health_check(&self) -> DatabaseResult<bool> {
        Ok(true)
    }
}
