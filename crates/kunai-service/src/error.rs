use thiserror::Error;

use crate::auth::token::TokenError;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    DatabaseError(#[from] kunai_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] kunai_core::error::CoreError),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    TokenError(#[from] TokenError),

    #[error("Authorization error: {0}")]
    AuthorizationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Diesel error: {0}")]
    DieselError(#[from] diesel::result::Error),
}

/// Maps a unique-constraint violation to `Conflict`; every other diesel
/// error passes through unchanged. Backstop for races the pre-insert
/// uniqueness checks cannot close.
pub(crate) fn map_unique_violation(err: diesel::result::Error) -> ServiceError {
    match err {
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _info,
        ) => ServiceError::Conflict("User already exists".to_string()),
        other => other.into(),
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
