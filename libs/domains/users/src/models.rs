use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// User entity - matches the SQL schema
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// User email (unique)
    pub email: String,
    /// User display name
    pub name: String,
    /// Argon2 password hash (never exposed in API responses)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// User response DTO (without password_hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for creating a new user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub password: String,
}

/// DTO for user login
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email, length(max = 255))]
    pub email: String,
    pub password: String,
}

/// DTO for user registration
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email, length(max = 255))]
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Response after successful login/register
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub user: UserResponse,
    /// Bearer token for clients that do not use the cookie
    pub access_token: String,
}

impl User {
    /// Create a new user (password already hashed by the service layer)
    pub fn new(email: String, name: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email,
            name,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}
