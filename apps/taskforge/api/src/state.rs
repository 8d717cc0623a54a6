//! Application state management.
//!
//! The shared state passed to all request handlers: configuration, the
//! PostgreSQL connection pool, and the JWT authenticator.

/// Shared application state.
///
/// Cloned per handler; all fields are cheap Arc-backed clones.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// PostgreSQL database connection pool
    pub db: database::postgres::DatabaseConnection,
    /// Stateless JWT authentication
    pub jwt_auth: axum_helpers::JwtAuth,
}
