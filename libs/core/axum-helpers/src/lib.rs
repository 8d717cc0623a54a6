//! # Axum Helpers
//!
//! A collection of utilities, middleware, and helpers for building Axum web
//! applications.
//!
//! ## Modules
//!
//! - **[`auth`]**: stateless JWT authentication and the `CurrentUser` extractor
//! - **[`server`]**: server setup, health checks, graceful shutdown
//! - **[`http`]**: HTTP middleware (security headers)
//! - **[`errors`]**: structured error responses with error codes
//! - **[`extractors`]**: custom extractors (UUID path, validated JSON)
//! - **[`audit`]**: audit logging for security-relevant mutations
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_app, create_router};
//! use core_config::server::ServerConfig;
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api_routes = Router::new(); // Add your routes
//!     let router = create_router::<ApiDoc>(api_routes).await?;
//!
//!     create_app(router, &ServerConfig::default()).await?;
//!     Ok(())
//! }
//! ```

// Domain modules
pub mod audit;
pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

// Re-export auth types
pub use auth::{
    ACCESS_TOKEN_TTL, CurrentUser, JwtAuth, JwtClaims, JwtConfig, REFRESH_TOKEN_TTL,
    jwt_auth_middleware, optional_jwt_auth_middleware,
};

// Re-export server types
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_app, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};

// Re-export HTTP middleware
pub use http::security_headers;

// Re-export error types
pub use errors::{AppError, ErrorCode, ErrorResponse};

// Re-export extractors
pub use extractors::{UuidPath, ValidatedJson};

// Re-export audit types
pub use audit::{AuditEvent, AuditOutcome, extract_ip_from_headers, extract_user_agent};
