pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Error as UuidError;
use validator::ValidationErrors;

/// Standard error response structure.
///
/// Returned for all error responses:
/// - `code`: integer error code for logging/monitoring (e.g. 1007)
/// - `error`: machine-readable error identifier (e.g. "FORBIDDEN")
/// - `message`: human-readable error message
/// - `details`: optional structured details (e.g. validation field errors)
///
/// # JSON Example
///
/// ```json
/// {
///   "code": 1007,
///   "error": "FORBIDDEN",
///   "message": "Access denied to project 0198c5f3-...",
///   "details": null
/// }
/// ```
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional structured error details (e.g., validation field errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Build a response body from an error code with a specific message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Application error type that can be converted to HTTP responses.
///
/// Integrates with common error types from dependencies and renders the
/// [`ErrorResponse`] envelope. Internal causes are logged, never exposed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("UUID error: {0}")]
    UuidError(#[from] UuidError),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Database(e) => handlers::map_db_error(e),
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(
                    error_code = ErrorCode::JsonExtraction.code(),
                    "JSON extraction error: {:?}",
                    e
                );
                (
                    e.status(),
                    ErrorResponse::new(ErrorCode::JsonExtraction, e.body_text()),
                )
            }
            AppError::ValidationError(e) => {
                tracing::info!(
                    error_code = ErrorCode::ValidationError.code(),
                    "Validation error: {:?}",
                    e
                );
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(
                        ErrorCode::ValidationError,
                        ErrorCode::ValidationError.default_message(),
                    )
                    .with_details(serde_json::to_value(&e).unwrap_or(serde_json::json!(null))),
                )
            }
            AppError::UuidError(e) => {
                tracing::warn!(
                    error_code = ErrorCode::InvalidUuid.code(),
                    "UUID error: {:?}",
                    e
                );
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(
                        ErrorCode::InvalidUuid,
                        ErrorCode::InvalidUuid.default_message(),
                    ),
                )
            }
            AppError::BadRequest(msg) => {
                tracing::info!("Bad request: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(ErrorCode::ValidationError, msg),
                )
            }
            AppError::Unauthorized(msg) => {
                tracing::info!("Unauthorized: {}", msg);
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse::new(ErrorCode::Unauthorized, msg),
                )
            }
            AppError::Forbidden(msg) => {
                tracing::info!("Forbidden: {}", msg);
                (
                    StatusCode::FORBIDDEN,
                    ErrorResponse::new(ErrorCode::Forbidden, msg),
                )
            }
            AppError::NotFound(msg) => {
                tracing::info!(error_code = ErrorCode::NotFound.code(), "Not found: {}", msg);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new(ErrorCode::NotFound, msg),
                )
            }
            AppError::Conflict(msg) => {
                tracing::info!("Conflict: {}", msg);
                (
                    StatusCode::CONFLICT,
                    ErrorResponse::new(ErrorCode::Conflict, msg),
                )
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(
                    error_code = ErrorCode::InternalError.code(),
                    "Internal server error: {}",
                    msg
                );
                // Generic message only; the cause stays in the log
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        ErrorCode::InternalError,
                        ErrorCode::InternalError.default_message(),
                    ),
                )
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::error!("Service unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse::new(
                        ErrorCode::ServiceUnavailable,
                        ErrorCode::ServiceUnavailable.default_message(),
                    ),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
