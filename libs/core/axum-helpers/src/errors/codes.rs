//! Type-safe error codes for API responses.
//!
//! Single source of truth for the error codes used across the application.
//! Each code carries a string identifier for clients, an integer code for
//! logging/monitoring, and a default human-readable message.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standardized error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request validation failed
    ValidationError,

    /// Invalid UUID format in path or query parameter
    InvalidUuid,

    /// JSON extraction from request body failed
    JsonExtraction,

    /// Requested resource was not found
    NotFound,

    /// An unexpected internal server error occurred
    InternalError,

    /// Authentication credentials are missing or invalid
    Unauthorized,

    /// Authenticated user lacks sufficient permissions
    Forbidden,

    /// Request conflicts with current resource state (e.g., duplicate resource)
    Conflict,

    /// Service is temporarily unavailable
    ServiceUnavailable,

    // Database errors (2000-2999)
    /// Database query returned no results
    DatabaseNotFound,

    /// Database connection or query error
    DatabaseError,

    /// Database migration failed
    MigrationError,
}

impl ErrorCode {
    /// String representation for client consumption (SCREAMING_SNAKE_CASE).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidUuid => "INVALID_UUID",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::NotFound => "NOT_FOUND",
            Self::InternalError => "INTERNAL_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Conflict => "CONFLICT",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::DatabaseNotFound => "DATABASE_NOT_FOUND",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::MigrationError => "MIGRATION_ERROR",
        }
    }

    /// Integer code for logging and monitoring.
    ///
    /// Ranges: 1000-1999 client errors, 2000-2999 database errors,
    /// 3000-3999 migration errors.
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidUuid => 1002,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::Unauthorized => 1006,
            Self::Forbidden => 1007,
            Self::Conflict => 1008,
            Self::ServiceUnavailable => 1011,
            Self::DatabaseNotFound => 2001,
            Self::DatabaseError => 2003,
            Self::MigrationError => 3001,
        }
    }

    /// Default user-facing error message.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidUuid => "Invalid UUID format",
            Self::JsonExtraction => "Failed to parse request body",
            Self::NotFound => "Resource not found",
            Self::InternalError => "An internal server error occurred",
            Self::Unauthorized => "Authentication required",
            Self::Forbidden => "Access forbidden",
            Self::Conflict => "Resource already exists",
            Self::ServiceUnavailable => "Service is temporarily unavailable",
            Self::DatabaseNotFound => "Database record not found",
            Self::DatabaseError => "Database error occurred",
            Self::MigrationError => "Database migration failed",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
