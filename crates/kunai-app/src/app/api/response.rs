//! Shared JSON response shapes and the status mapping for service errors.

use salvo::Response;
use salvo::http::StatusCode;
use salvo::writing::Json;
use serde::Serialize;

use kunai_db::error::DbError;
use kunai_service::error::ServiceError;

use crate::error::AppError;

/// ## Summary
/// Plain confirmation payload for operations that do not echo a resource.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// ## Summary
/// Error payload. The optional `error` field carries a machine-readable
/// code and is only rendered for token failures.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }

    #[must_use]
    pub fn with_code(message: impl Into<String>, code: &'static str) -> Self {
        Self {
            message: message.into(),
            error: Some(code),
        }
    }
}

/// ## Summary
/// Writes a service error as a JSON response with the matching status code.
///
/// Client-caused failures carry their message through unchanged; anything
/// internal is logged and collapsed into a generic 500 body so store
/// details never leak to the wire.
pub fn write_service_error(res: &mut Response, err: &ServiceError) {
    match err {
        ServiceError::ValidationError(message) => {
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse::new(message.as_str())));
        }
        ServiceError::NotAuthenticated => {
            res.status_code(StatusCode::UNAUTHORIZED);
            res.render(Json(ErrorResponse::new("Not authenticated")));
        }
        ServiceError::InvalidCredentials => {
            res.status_code(StatusCode::UNAUTHORIZED);
            res.render(Json(ErrorResponse::new(err.to_string())));
        }
        ServiceError::TokenError(token_err) => {
            res.status_code(StatusCode::UNAUTHORIZED);
            res.render(Json(ErrorResponse::with_code(
                token_err.to_string(),
                token_err.code(),
            )));
        }
        ServiceError::AuthorizationError(message) => {
            res.status_code(StatusCode::FORBIDDEN);
            res.render(Json(ErrorResponse::new(message.as_str())));
        }
        ServiceError::NotFound(message) => {
            res.status_code(StatusCode::NOT_FOUND);
            res.render(Json(ErrorResponse::new(message.as_str())));
        }
        ServiceError::Conflict(message) => {
            res.status_code(StatusCode::CONFLICT);
            res.render(Json(ErrorResponse::new(message.as_str())));
        }
        ServiceError::DatabaseError(DbError::PoolError(pool_err)) => {
            tracing::error!(error = %pool_err, "Failed to get database connection");
            res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            res.render(Json(ErrorResponse::new("Database unavailable")));
        }
        other => {
            tracing::error!(error = %other, "Request failed with an internal error");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("An internal error occurred")));
        }
    }
}

/// ## Summary
/// Writes an application error, delegating service errors to
/// [`write_service_error`] and treating everything else as internal.
pub fn write_app_error(res: &mut Response, err: &AppError) {
    match err {
        AppError::ServiceError(service_err) => write_service_error(res, service_err),
        other => {
            tracing::error!(error = %other, "Request failed with an internal error");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("An internal error occurred")));
        }
    }
}
