//! The authenticated principal, as seen by handlers and core operations.

use super::jwt::JwtClaims;
use crate::errors::AppError;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// The currently authenticated user.
///
/// Built from verified JWT claims by the auth middleware and handed to every
/// core operation as an explicit argument. Plain data: constructible directly
/// in tests without any request machinery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl CurrentUser {
    pub fn new(id: Uuid, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
        }
    }
}

impl TryFrom<&JwtClaims> for CurrentUser {
    type Error = uuid::Error;

    fn try_from(claims: &JwtClaims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&claims.sub)?,
            email: claims.email.clone(),
            name: claims.name.clone(),
        })
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            // Reaching here means the route was not wrapped in jwt_auth_middleware
            AppError::Unauthorized("Authentication required".to_string()).into_response()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_claims() {
        let id = Uuid::new_v4();
        let claims = JwtClaims {
            sub: id.to_string(),
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            exp: 0,
            iat: 0,
            jti: "jti".to_string(),
        };

        let user = CurrentUser::try_from(&claims).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.email, "alice@example.com");
    }

    #[test]
    fn test_from_claims_rejects_bad_subject() {
        let claims = JwtClaims {
            sub: "not-a-uuid".to_string(),
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            exp: 0,
            iat: 0,
            jti: "jti".to_string(),
        };

        assert!(CurrentUser::try_from(&claims).is_err());
    }
}
