//! API key resolution for the credential surface.

use localauth_core::error::{LocalAuthError, LocalAuthResult};
use localauth_core::repository::TenantRepository;
use tracing::debug;
use uuid::Uuid;

use crate::error::AuthError;

/// The tenant a credential request was routed to, as resolved from its
/// API key. Carries the signing secret for downstream token handling.
#[derive(Clone)]
pub struct TenantContext {
    pub tenant_id: Uuid,
    pub signing_secret: String,
}

impl TenantContext {
    pub fn new(tenant_id: Uuid, signing_secret: impl Into<String>) -> Self {
        Self {
            tenant_id,
            signing_secret: signing_secret.into(),
        }
    }
}

impl std::fmt::Debug for TenantContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantContext")
            .field("tenant_id", &self.tenant_id)
            .finish_non_exhaustive()
    }
}

/// Resolves presented API keys to tenants through the registry.
#[derive(Debug, Clone)]
pub struct ApiKeyAuthenticator<T: TenantRepository> {
    registry: T,
}

impl<T: TenantRepository> ApiKeyAuthenticator<T> {
    pub fn new(registry: T) -> Self {
        Self { registry }
    }

    /// Resolve `api_key` to its tenant.
    ///
    /// A missing or blank key and an unknown key are authentication
    /// failures; registry faults propagate unchanged.
    pub async fn authenticate(&self, api_key: Option<&str>) -> LocalAuthResult<TenantContext> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(AuthError::MissingApiKey)?;

        let tenant = match self.registry.get_by_api_key(api_key).await {
            Ok(tenant) => tenant,
            Err(LocalAuthError::NotFound { .. }) => {
                debug!("Rejected unknown API key");
                return Err(AuthError::InvalidApiKey.into());
            }
            Err(e) => return Err(e),
        };

        Ok(TenantContext {
            tenant_id: tenant.id,
            signing_secret: tenant.signing_secret,
        })
    }
}
