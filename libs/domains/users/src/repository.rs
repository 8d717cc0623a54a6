use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::User;

/// Repository trait for User persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: User) -> UserResult<User>;

    /// Get a user by ID
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Get a user by email (case-insensitive)
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Check if an email already exists
    async fn email_exists(&self, email: &str) -> UserResult<bool>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        let email_exists = users
            .values()
            .any(|u| u.email.to_lowercase() == user.email.to_lowercase());

        if email_exists {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        let user = users
            .values()
            .find(|u| u.email.to_lowercase() == email.to_lowercase())
            .cloned();
        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        Ok(self.get_by_email(email).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_by_email() {
        let repo = InMemoryUserRepository::new();
        let user = User::new(
            "alice@example.com".to_string(),
            "Alice".to_string(),
            "hash".to_string(),
        );

        let created = repo.create(user.clone()).await.unwrap();
        assert_eq!(created.id, user.id);

        let found = repo.get_by_email("ALICE@example.com").await.unwrap();
        assert_eq!(found.unwrap().id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryUserRepository::new();
        let first = User::new(
            "bob@example.com".to_string(),
            "Bob".to_string(),
            "hash".to_string(),
        );
        let second = User::new(
            "Bob@Example.com".to_string(),
            "Bobby".to_string(),
            "hash".to_string(),
        );

        repo.create(first).await.unwrap();
        let result = repo.create(second).await;

        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }
}
