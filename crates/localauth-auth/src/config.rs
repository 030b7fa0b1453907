//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Argon2id cost parameters used for new hashes.
///
/// The parameters are written into every PHC hash string, so raising them
/// later does not break verification of hashes made with older values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordHashParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for PasswordHashParams {
    /// OWASP recommendation for Argon2id: m=19 MiB, t=2, p=1.
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Configuration for the credential and session services.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Session token lifetime in seconds (default: 604_800 = 7 days).
    pub session_lifetime_secs: u64,
    /// Cost parameters for newly hashed passwords.
    pub password_hash: PasswordHashParams,
    /// Optional pepper prepended to passwords before hashing and
    /// verification.
    pub pepper: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_lifetime_secs: 604_800,
            password_hash: PasswordHashParams::default(),
            pepper: None,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("session_lifetime_secs", &self.session_lifetime_secs)
            .field("password_hash", &self.password_hash)
            .field("pepper", &self.pepper.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.session_lifetime_secs, 7 * 24 * 60 * 60);
        assert_eq!(config.password_hash.memory_kib, 19_456);
        assert!(config.pepper.is_none());
    }

    #[test]
    fn debug_hides_pepper() {
        let config = AuthConfig {
            pepper: Some("pepper!".into()),
            ..Default::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("pepper!"));
        assert!(rendered.contains("<redacted>"));
    }
}
