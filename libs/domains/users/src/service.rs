use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, User, UserResponse};
use crate::repository::UserRepository;

/// Service layer for User business logic
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new user with password hashing
    pub async fn create_user(&self, input: CreateUser) -> UserResult<UserResponse> {
        self.validate_password(&input.password)?;

        if self.repository.email_exists(&input.email).await? {
            return Err(UserError::DuplicateEmail(input.email));
        }

        let password_hash = self.hash_password(&input.password)?;
        let user = User::new(input.email, input.name, password_hash);

        let created = self.repository.create(user).await?;
        Ok(created.into())
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: Uuid) -> UserResult<UserResponse> {
        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        Ok(user.into())
    }

    /// Get a user by email
    pub async fn get_user_by_email(&self, email: &str) -> UserResult<UserResponse> {
        let user = self.repository.get_by_email(email).await?.ok_or_else(|| {
            UserError::Validation(format!("User with email '{}' not found", email))
        })?;

        Ok(user.into())
    }

    /// Verify user credentials (for login)
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> UserResult<UserResponse> {
        let user = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }

        Ok(user.into())
    }

    // Password helpers

    fn hash_password(&self, password: &str) -> UserResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::PasswordHash(e.to_string()))
    }

    fn verify_password(&self, password: &str, hash: &str) -> UserResult<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    // Email and name validation is handled by ValidatedJson<T> at the handler
    // level; password rules cannot be expressed as field attributes, so they
    // live here.

    fn validate_password(&self, password: &str) -> UserResult<()> {
        if password.len() < 8 {
            return Err(UserError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        if password.len() > 128 {
            return Err(UserError::Validation(
                "Password cannot exceed 128 characters".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryUserRepository;

    fn service() -> UserService<InMemoryUserRepository> {
        UserService::new(InMemoryUserRepository::new())
    }

    fn create_input(email: &str) -> CreateUser {
        CreateUser {
            email: email.to_string(),
            name: "Test User".to_string(),
            password: "correct horse battery".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let service = service();
        let created = service
            .create_user(create_input("alice@example.com"))
            .await
            .unwrap();

        assert_eq!(created.email, "alice@example.com");

        // The stored hash must verify against the original password
        let verified = service
            .verify_credentials("alice@example.com", "correct horse battery")
            .await
            .unwrap();
        assert_eq!(verified.id, created.id);
    }

    #[tokio::test]
    async fn test_create_user_rejects_short_password() {
        let service = service();
        let mut input = create_input("alice@example.com");
        input.password = "short".to_string();

        let result = service.create_user(input).await;
        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_email() {
        let service = service();
        service
            .create_user(create_input("alice@example.com"))
            .await
            .unwrap();

        let result = service.create_user(create_input("alice@example.com")).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_verify_credentials_wrong_password() {
        let service = service();
        service
            .create_user(create_input("alice@example.com"))
            .await
            .unwrap();

        let result = service
            .verify_credentials("alice@example.com", "wrong password!")
            .await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_verify_credentials_unknown_email() {
        let service = service();
        let result = service
            .verify_credentials("ghost@example.com", "whatever1")
            .await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }
}
