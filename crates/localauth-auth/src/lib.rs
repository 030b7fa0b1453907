//! LocalAuth Auth: password hashing, per-tenant session tokens, API key
//! resolution, and the credential and tenant-admin services.

pub mod admin;
pub mod authenticator;
pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use admin::TenantAdminService;
pub use authenticator::{ApiKeyAuthenticator, TenantContext};
pub use config::{AuthConfig, PasswordHashParams};
pub use error::AuthError;
pub use service::{AuthSession, CredentialService, SignInInput, SignUpInput};
pub use token::{SessionClaims, SessionService};
