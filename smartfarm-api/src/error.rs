//! Error types for smartfarm-api
//!
//! Defines the service error type and its mapping onto HTTP status codes
//! and the shared response envelope.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde_json::Value;
use smartfarm_common::api::ApiEnvelope;
use thiserror::Error;
use tracing::error;

/// Main error type for smartfarm-api
#[derive(Error, Debug)]
pub enum ApiError {
    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Request body or parameter validation failure, with field details
    #[error("Validation error: {message}")]
    Validation { message: String, details: Value },

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Uniqueness conflict (duplicate username, crop name, ...)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using the service error
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Validation error without field details
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: Value::Object(Default::default()),
        }
    }

    /// Validation error for a single field
    pub fn field_error(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        ApiError::Validation {
            details: serde_json::json!({ field: [message.clone()] }),
            message,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<smartfarm_common::Error> for ApiError {
    fn from(err: smartfarm_common::Error) -> Self {
        use smartfarm_common::Error;
        match err {
            Error::Database(e) => ApiError::Database(e),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(msg) => ApiError::bad_request(msg),
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            Error::Forbidden(msg) => ApiError::Forbidden(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::Io(e) => ApiError::Internal(e.to_string()),
            Error::Config(msg) | Error::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<smartfarm_common::api::auth::ApiAuthError> for ApiError {
    fn from(err: smartfarm_common::api::auth::ApiAuthError) -> Self {
        use smartfarm_common::api::auth::ApiAuthError;
        match err {
            ApiAuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid username or password".to_string())
            }
            ApiAuthError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            ApiAuthError::InvalidToken(reason) => ApiError::Unauthorized(reason),
            ApiAuthError::HashError(e) | ApiAuthError::DatabaseError(e) => ApiError::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("API error: {}", self);
        }

        let details = match &self {
            ApiError::Validation { details, .. } => Some(details.clone()),
            _ => None,
        };

        // Internal detail strings stay out of 500 responses
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "An error occurred".to_string()
        } else {
            self.to_string()
        };

        let envelope = ApiEnvelope::error(status.as_u16(), message, details);
        (status, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_field_error_details() {
        let err = ApiError::field_error("region", "This field is required.");
        match err {
            ApiError::Validation { details, .. } => {
                assert_eq!(details["region"][0], "This field is required.");
            }
            _ => panic!("expected validation error"),
        }
    }
}
