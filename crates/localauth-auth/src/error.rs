//! Authentication error types.

use localauth_core::error::LocalAuthError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email and wrong password deliberately share this variant.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing x-api-key header")]
    MissingApiKey,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Missing or invalid Authorization header")]
    MissingBearerToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for LocalAuthError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Crypto(msg) => LocalAuthError::Crypto(msg),
            other => LocalAuthError::AuthenticationFailed {
                reason: other.to_string(),
            },
        }
    }
}
