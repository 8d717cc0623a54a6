//! Fallback handlers and database error mapping.

use super::{ErrorCode, ErrorResponse};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;

/// Handler for 404 Not Found on unmatched routes.
pub async fn not_found() -> Response {
    let body = Json(ErrorResponse::new(
        ErrorCode::NotFound,
        "The requested resource was not found",
    ));

    (StatusCode::NOT_FOUND, body).into_response()
}

/// Map a SeaORM error to a status code and response body.
///
/// Record-not-found surfaces as 404; everything else is a 500 with the
/// generic database message. The concrete cause goes to the log only.
pub fn map_db_error(err: DbErr) -> (StatusCode, ErrorResponse) {
    match err {
        DbErr::RecordNotFound(ref what) => {
            tracing::info!(
                error_code = ErrorCode::DatabaseNotFound.code(),
                "Database record not found: {}",
                what
            );
            (
                StatusCode::NOT_FOUND,
                ErrorResponse::new(
                    ErrorCode::DatabaseNotFound,
                    ErrorCode::DatabaseNotFound.default_message(),
                ),
            )
        }
        other => {
            tracing::error!(
                error_code = ErrorCode::DatabaseError.code(),
                "Database error: {:?}",
                other
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(
                    ErrorCode::DatabaseError,
                    ErrorCode::DatabaseError.default_message(),
                ),
            )
        }
    }
}
