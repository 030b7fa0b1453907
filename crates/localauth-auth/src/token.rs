//! Session token issuance and verification.
//!
//! Session tokens are HS256 JWTs signed with the owning tenant's secret.
//! They are stateless: validity is signature plus expiry, and any process
//! holding the same secret can verify them.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::authenticator::TenantContext;
use crate::error::AuthError;

/// Claims embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: user ID (UUID string).
    pub sub: String,
    /// Tenant ID (UUID string).
    pub tenant_id: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

impl SessionClaims {
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|e| AuthError::TokenInvalid(format!("sub: {e}")))
    }
}

/// Issues and verifies per-tenant session tokens.
#[derive(Debug, Clone)]
pub struct SessionService {
    lifetime_secs: i64,
}

impl SessionService {
    pub fn new(lifetime_secs: u64) -> Self {
        Self {
            lifetime_secs: i64::try_from(lifetime_secs).unwrap_or(i64::MAX),
        }
    }

    /// Sign a token for `(user_id, tenant_id)` with the tenant's secret.
    pub fn issue(
        &self,
        signing_secret: &str,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            tenant_id: tenant_id.to_string(),
            iat: now,
            exp: now.saturating_add(self.lifetime_secs),
        };

        let key = EncodingKey::from_secret(signing_secret.as_bytes());
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
            .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
    }

    /// Check signature and expiry and return the claims.
    pub fn verify(&self, signing_secret: &str, token: &str) -> Result<SessionClaims, AuthError> {
        let key = DecodingKey::from_secret(signing_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);

        jsonwebtoken::decode::<SessionClaims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid(e.to_string()),
            })
    }

    /// Verify a token presented to `tenant` and return the user it names.
    ///
    /// Besides the signature, the `tenant_id` claim must match the tenant
    /// the request was routed to.
    pub fn authenticate(&self, tenant: &TenantContext, token: &str) -> Result<Uuid, AuthError> {
        let claims = self.verify(&tenant.signing_secret, token)?;
        if claims.tenant_id != tenant.tenant_id.to_string() {
            return Err(AuthError::TokenInvalid("token issued for another app".into()));
        }
        claims.user_id()
    }
}

/// Extracts the bearer token from an Authorization header value.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
