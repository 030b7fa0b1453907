//! Shared application state.

use std::collections::HashSet;
use std::sync::Arc;

use localauth_auth::{ApiKeyAuthenticator, CredentialService, TenantAdminService};
use localauth_core::repository::TenantRepository;
use localauth_db::TenantStoreManager;
use localauth_db::repository::SqliteTenantRepository;
use tracing::info;
use uuid::Uuid;

use crate::config::ServerConfig;

pub type Registry = Arc<SqliteTenantRepository>;
pub type Stores = Arc<TenantStoreManager>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub registry: Registry,
    pub stores: Stores,
    pub authenticator: Arc<ApiKeyAuthenticator<Registry>>,
    pub credentials: Arc<CredentialService<Stores>>,
    pub admin: Arc<TenantAdminService<Registry, Stores>>,
}

impl AppState {
    /// Open the registry under `config.data_dir` and wire the services.
    /// Tenant stores are opened lazily.
    pub fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let db_config = config.db_config();
        let registry = Arc::new(SqliteTenantRepository::open(&db_config)?);
        let stores = Arc::new(TenantStoreManager::new(db_config)?);
        info!(data_dir = %config.data_dir.display(), "Opened tenant registry");

        Ok(Self {
            authenticator: Arc::new(ApiKeyAuthenticator::new(Arc::clone(&registry))),
            credentials: Arc::new(CredentialService::new(
                Arc::clone(&stores),
                config.auth.clone(),
            )),
            admin: Arc::new(TenantAdminService::new(
                Arc::clone(&registry),
                Arc::clone(&stores),
            )),
            registry,
            stores,
            config: Arc::new(config),
        })
    }

    /// Remove store files left behind by tenants that no longer exist.
    pub async fn sweep_orphan_stores(&self) -> anyhow::Result<Vec<Uuid>> {
        let known: HashSet<Uuid> = self
            .registry
            .list()
            .await?
            .into_iter()
            .map(|tenant| tenant.id)
            .collect();
        Ok(self.stores.sweep_orphans(&known)?)
    }
}
