//! API error responses.
//!
//! Translates engine outcomes into status codes and envelope bodies:
//!
//! | outcome                         | status                    |
//! |---------------------------------|---------------------------|
//! | validation failure              | 422 + field map           |
//! | record not found                | 404                       |
//! | invalid/expired/malformed token | 401                       |
//! | bad login                       | 401                       |
//! | missing authentication          | 401                       |
//! | capability denied / not owner   | 403                       |
//! | infrastructure failure          | 500 (detail logged only)  |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use crate::dto::Envelope;
use vendo_core::{DomainError, ValidationErrors};
use vendo_engine::EngineError;

/// Error type returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    /// Semantically invalid input; carries the field map.
    Validation(ValidationErrors),

    /// The requested resource does not exist.
    NotFound,

    /// No usable credentials: the token was malformed, unknown or expired.
    InvalidToken,

    /// Login failed.
    InvalidCredentials,

    /// The route needs an authenticated caller and got an anonymous one.
    AuthenticationRequired,

    /// The caller is authenticated but lacks the capability, or does not
    /// own the record it is trying to mutate.
    Forbidden,

    /// Infrastructure failure. The detail is logged, never sent.
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(errors) => ApiError::Validation(errors),
            EngineError::Domain(DomainError::RecordNotFound) => ApiError::NotFound,
            EngineError::Domain(DomainError::InvalidCredentials) => ApiError::InvalidCredentials,
            EngineError::Domain(DomainError::NoPermission) => ApiError::Forbidden,
            // The services normally fold duplicates into validation maps;
            // a bare variant still renders as a field error.
            EngineError::Domain(kind @ DomainError::DuplicateUsername) => {
                let mut errors = ValidationErrors::default();
                errors.add("username", kind.to_string());
                ApiError::Validation(errors)
            }
            EngineError::Domain(kind @ DomainError::DuplicateProductName) => {
                let mut errors = ValidationErrors::default();
                errors.add("name", kind.to_string());
                ApiError::Validation(errors)
            }
            EngineError::RandomSource(detail) => ApiError::Internal(detail),
            EngineError::PasswordHash(detail) => ApiError::Internal(detail),
            EngineError::Db(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, envelope) = match self {
            ApiError::Validation(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Envelope::validation(errors))
            }
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Envelope::error("the requested resource could not be found"),
            ),
            ApiError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                Envelope::error("invalid or missing authentication token"),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Envelope::error("invalid authentication credentials"),
            ),
            ApiError::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                Envelope::error("you must be authenticated to access this resource"),
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                Envelope::error("your user account doesn't have the necessary permissions"),
            ),
            ApiError::Internal(detail) => {
                error!(detail = %detail, "Internal error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Envelope::error("the server encountered a problem and could not process your request"),
                )
            }
        };

        (status, Json(envelope)).into_response()
    }
}
