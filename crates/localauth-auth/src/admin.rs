//! Operator-facing tenant administration.
//!
//! This surface is trusted (local only) and talks to the registry and
//! the store manager directly, bypassing API key resolution.

use localauth_core::error::{LocalAuthError, LocalAuthResult};
use localauth_core::models::tenant::{CreateTenant, Tenant, TenantSummary, UpdateTenant};
use localauth_core::models::user::UserProfile;
use localauth_core::repository::{TenantRepository, TenantStoreProvider, UserRepository};
use tracing::{error, info, warn};
use uuid::Uuid;

pub struct TenantAdminService<T: TenantRepository, S: TenantStoreProvider> {
    registry: T,
    stores: S,
}

impl<T: TenantRepository, S: TenantStoreProvider> TenantAdminService<T, S> {
    pub fn new(registry: T, stores: S) -> Self {
        Self { registry, stores }
    }

    /// Register a tenant and initialise its store.
    ///
    /// If the store cannot be created the registry row is removed again,
    /// so a failed create leaves nothing behind.
    pub async fn create_tenant(&self, input: CreateTenant) -> LocalAuthResult<TenantSummary> {
        if input.name.trim().is_empty() {
            return Err(LocalAuthError::validation("App name is required"));
        }

        let tenant = self.registry.create(input).await?;
        if let Err(e) = self.stores.open(tenant.id) {
            error!(tenant_id = %tenant.id, error = %e, "Failed to initialise app store");
            if let Err(cleanup) = self.registry.delete(tenant.id).await {
                error!(tenant_id = %tenant.id, error = %cleanup, "Failed to roll back app registration");
            }
            return Err(e);
        }

        Ok(TenantSummary {
            tenant,
            user_count: 0,
        })
    }

    /// All tenants, newest first, each with its live user count.
    pub async fn list_tenants(&self) -> LocalAuthResult<Vec<TenantSummary>> {
        let tenants = self.registry.list().await?;
        let mut summaries = Vec::with_capacity(tenants.len());
        for tenant in tenants {
            summaries.push(self.summarize(tenant).await);
        }
        Ok(summaries)
    }

    pub async fn get_tenant(&self, id: Uuid) -> LocalAuthResult<TenantSummary> {
        let tenant = self.registry.get_by_id(id).await?;
        Ok(self.summarize(tenant).await)
    }

    pub async fn update_tenant(
        &self,
        id: Uuid,
        input: UpdateTenant,
    ) -> LocalAuthResult<TenantSummary> {
        if input.is_empty() {
            return Err(LocalAuthError::validation("No fields to update"));
        }
        if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(LocalAuthError::validation("App name cannot be empty"));
        }
        let tenant = self.registry.update(id, input).await?;
        Ok(self.summarize(tenant).await)
    }

    /// Delete a tenant and its entire user store.
    ///
    /// The registry row goes first. Once it is committed the tenant is
    /// unreachable, so a failure destroying the store only leaves an
    /// unreferenced file, which the startup sweep removes.
    pub async fn delete_tenant(&self, id: Uuid) -> LocalAuthResult<()> {
        self.registry.delete(id).await?;
        if let Err(e) = self.stores.destroy(id) {
            error!(tenant_id = %id, error = %e, "App removed but its store could not be destroyed");
        }
        info!(tenant_id = %id, "Deleted app");
        Ok(())
    }

    /// Users of a tenant, newest first, without password hashes.
    pub async fn list_users(&self, tenant_id: Uuid) -> LocalAuthResult<Vec<UserProfile>> {
        self.registry.get_by_id(tenant_id).await?;
        let users = self.stores.open(tenant_id)?;
        Ok(users
            .list()
            .await?
            .into_iter()
            .map(UserProfile::from)
            .collect())
    }

    pub async fn delete_user(&self, tenant_id: Uuid, user_id: Uuid) -> LocalAuthResult<()> {
        self.registry.get_by_id(tenant_id).await?;
        let users = self.stores.open(tenant_id)?;
        users.delete(user_id).await?;
        info!(tenant_id = %tenant_id, user_id = %user_id, "Deleted user");
        Ok(())
    }

    /// Attach the live user count. A store that cannot be read counts
    /// as empty rather than failing the listing.
    async fn summarize(&self, tenant: Tenant) -> TenantSummary {
        let user_count = match self.stores.open(tenant.id) {
            Ok(users) => users.count().await,
            Err(e) => Err(e),
        };
        let user_count = user_count.unwrap_or_else(|e| {
            warn!(tenant_id = %tenant.id, error = %e, "User count unavailable");
            0
        });
        TenantSummary { tenant, user_count }
    }
}
