use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT token time-to-live constants
pub const ACCESS_TOKEN_TTL: i64 = 900; // 15 minutes
pub const REFRESH_TOKEN_TTL: i64 = 604800; // 7 days

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,   // Subject (user ID)
    pub email: String, // User email
    pub name: String,  // User display name
    pub exp: i64,      // Expiration time
    pub iat: i64,      // Issued at
    pub jti: String,   // JWT ID
}

/// Stateless JWT authentication (HS256).
///
/// Verification is purely cryptographic: signature plus expiry. There is no
/// server-side token registry, so revocation happens by letting the short
/// access TTL lapse.
#[derive(Clone)]
pub struct JwtAuth {
    secret: String,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        tracing::info!("JWT auth initialized");
        Self {
            secret: config.secret.clone(),
        }
    }

    /// Create access token (15 min)
    pub fn create_access_token(
        &self,
        user_id: &str,
        email: &str,
        name: &str,
    ) -> eyre::Result<String> {
        self.create_token(user_id, email, name, ACCESS_TOKEN_TTL)
    }

    /// Create refresh token (7 days)
    pub fn create_refresh_token(
        &self,
        user_id: &str,
        email: &str,
        name: &str,
    ) -> eyre::Result<String> {
        self.create_token(user_id, email, name, REFRESH_TOKEN_TTL)
    }

    fn create_token(
        &self,
        user_id: &str,
        email: &str,
        name: &str,
        ttl_seconds: i64,
    ) -> eyre::Result<String> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let header = Header {
            alg: jsonwebtoken::Algorithm::HS256,
            ..Default::default()
        };

        let token = encode(
            &header,
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Verify JWT token signature and decode claims
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}
