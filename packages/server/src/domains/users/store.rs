//! Credential store interface and the in-memory implementation.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{normalize_email, Group, NewUser, Role, User};

/// Credential store failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("A user with email {0} already exists")]
    DuplicateEmail(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Data-access interface for user records
///
/// Implementations must treat email lookups case-insensitively.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn create_user(&self, new_user: NewUser) -> StoreResult<User>;
}

/// In-memory user store
///
/// Backs tests and database-less development runs.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the blocked flag on an existing user. Returns false if the user is unknown.
    pub async fn set_blocked(&self, id: Uuid, blocked: bool) -> bool {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) => {
                user.blocked = blocked;
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = normalize_email(email);
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let email = normalize_email(&new_user.email);
        let mut users = self.users.write().await;

        if users.values().any(|user| user.email == email) {
            return Err(StoreError::DuplicateEmail(email));
        }

        let user = User {
            id: Uuid::new_v4(),
            email,
            name: new_user.name,
            password_hash: new_user.password_hash,
            blocked: new_user.blocked,
            contact_number: new_user.contact_number,
            created_at: Utc::now(),
            roles: new_user
                .roles
                .into_iter()
                .map(|name| Role {
                    id: Uuid::new_v4(),
                    name,
                })
                .collect(),
            groups: new_user
                .groups
                .into_iter()
                .map(|name| Group {
                    id: Uuid::new_v4(),
                    name,
                })
                .collect(),
        };

        users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: "Admin".to_string(),
            password_hash: "hash".to_string(),
            blocked: false,
            contact_number: Some("1234567890".to_string()),
            roles: vec!["Super Admin".to_string()],
            groups: vec!["Admins".to_string()],
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let store = InMemoryUserStore::new();
        let created = store.create_user(new_user("Admin@Example.com")).await.unwrap();

        assert_eq!(created.email, "admin@example.com");
        assert!(created.has_role("Super Admin"));
        assert!(created.in_group("Admins"));

        let by_id = store.find_by_id(created.id).await.unwrap();
        assert_eq!(by_id.as_ref().map(|u| u.id), Some(created.id));

        let by_email = store.find_by_email("ADMIN@example.com").await.unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(created.id));
    }

    #[tokio::test]
    async fn test_unknown_user_is_none() {
        let store = InMemoryUserStore::new();
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
        assert!(store.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryUserStore::new();
        store.create_user(new_user("admin@example.com")).await.unwrap();

        let result = store.create_user(new_user("ADMIN@example.com")).await;
        assert!(matches!(result, Err(StoreError::DuplicateEmail(_))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_set_blocked() {
        let store = InMemoryUserStore::new();
        let user = store.create_user(new_user("admin@example.com")).await.unwrap();

        assert!(store.set_blocked(user.id, true).await);
        assert!(store.find_by_id(user.id).await.unwrap().unwrap().blocked);
        assert!(!store.set_blocked(Uuid::new_v4(), true).await);
    }
}
