//! Error types for the LocalAuth system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocalAuthError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("{entity} with this {field} already exists")]
    AlreadyExists { entity: String, field: String },

    #[error("authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("cryptography error: {0}")]
    Crypto(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl LocalAuthError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type LocalAuthResult<T> = Result<T, LocalAuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_names_the_field() {
        let err = LocalAuthError::AlreadyExists {
            entity: "user".into(),
            field: "email".into(),
        };
        assert_eq!(err.to_string(), "user with this email already exists");
    }

    #[test]
    fn not_found_helper() {
        let err = LocalAuthError::not_found("app", "abc");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "app not found: abc");
    }
}
