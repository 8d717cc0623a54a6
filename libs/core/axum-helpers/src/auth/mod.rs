//! Stateless JWT authentication.
//!
//! Tokens are signed HS256 with a shared secret from [`JwtConfig`]. The
//! middleware verifies signature and expiry, then exposes the authenticated
//! principal to handlers through the [`CurrentUser`] extractor; core
//! operations receive the acting user as an explicit argument, never from
//! ambient state.

pub mod config;
pub mod jwt;
pub mod middleware;
pub mod user;

pub use config::JwtConfig;
pub use jwt::{ACCESS_TOKEN_TTL, JwtAuth, JwtClaims, REFRESH_TOKEN_TTL};
pub use middleware::{jwt_auth_middleware, optional_jwt_auth_middleware};
pub use user::CurrentUser;
