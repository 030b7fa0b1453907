//! HTTP error mapping.
//!
//! Every failure leaves the server as `{"error": <message>, "code": <CODE>}`
//! with a matching status. Internal details are logged, never returned.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use localauth_auth::AuthError;
use localauth_core::error::LocalAuthError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Carries the detail for the log; the client sees a generic message.
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            tracing::error!(error = %detail, "Request failed");
        }
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.error_code(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<LocalAuthError> for ApiError {
    fn from(err: LocalAuthError) -> Self {
        match err {
            LocalAuthError::Validation { message } => Self::BadRequest(message),
            LocalAuthError::AuthenticationFailed { reason } => Self::Unauthorized(reason),
            LocalAuthError::NotFound { entity, .. } => {
                Self::NotFound(format!("{} not found", capitalize(&entity)))
            }
            LocalAuthError::AlreadyExists { entity, field } => {
                Self::Conflict(match (entity.as_str(), field.as_str()) {
                    ("user", "email") => "Email already registered".into(),
                    ("user", "username") => "Username already taken".into(),
                    _ => format!("{} with this {field} already exists", capitalize(&entity)),
                })
            }
            LocalAuthError::Storage(msg)
            | LocalAuthError::Crypto(msg)
            | LocalAuthError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        LocalAuthError::from(err).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        let cases = [
            (LocalAuthError::validation("x"), StatusCode::BAD_REQUEST),
            (LocalAuthError::not_found("app", "1"), StatusCode::NOT_FOUND),
            (
                LocalAuthError::AuthenticationFailed {
                    reason: "x".into(),
                },
                StatusCode::UNAUTHORIZED,
            ),
            (
                LocalAuthError::AlreadyExists {
                    entity: "user".into(),
                    field: "email".into(),
                },
                StatusCode::CONFLICT,
            ),
            (
                LocalAuthError::Storage("disk".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn messages_match_wire_format() {
        let err = ApiError::from(LocalAuthError::not_found("app", "abc"));
        assert_eq!(err.to_string(), "App not found");

        let err = ApiError::from(LocalAuthError::AlreadyExists {
            entity: "user".into(),
            field: "username".into(),
        });
        assert_eq!(err.to_string(), "Username already taken");

        let err = ApiError::from(AuthError::InvalidCredentials);
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[test]
    fn internal_detail_is_hidden() {
        let err = ApiError::from(LocalAuthError::Storage("database is locked".into()));
        assert_eq!(err.to_string(), "Internal server error");
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }
}
