//! Users Domain
//!
//! Identity context for the API: user records, password hashing, and the
//! auth endpoints that issue JWTs. Every other domain consumes identity only
//! as the `CurrentUser` value produced here.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← register/login/refresh/logout/me
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← credential verification, hashing, validation
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← data access (trait + implementations)
//! └─────────────┘
//! ```

pub mod auth_handlers;
pub mod error;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{UserError, UserResult};
pub use models::{CreateUser, LoginRequest, LoginResponse, RegisterRequest, User, UserResponse};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
