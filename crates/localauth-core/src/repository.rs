//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant users live in a
//! physically separate store per tenant, so [`UserRepository`] methods
//! take no tenant id: a handle obtained from [`TenantStoreProvider::open`]
//! can only ever see its own tenant's rows.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::LocalAuthResult;
use crate::models::{
    tenant::{CreateTenant, Tenant, UpdateTenant},
    user::{CreateUser, UpdateUser, User},
};

// ---------------------------------------------------------------------------
// Tenant registry (global scope)
// ---------------------------------------------------------------------------

pub trait TenantRepository: Send + Sync {
    /// Register a tenant, generating its id, API key and signing secret.
    fn create(&self, input: CreateTenant) -> impl Future<Output = LocalAuthResult<Tenant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LocalAuthResult<Tenant>> + Send;
    fn get_by_api_key(
        &self,
        api_key: &str,
    ) -> impl Future<Output = LocalAuthResult<Tenant>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateTenant,
    ) -> impl Future<Output = LocalAuthResult<Tenant>> + Send;
    /// Remove the registry row. Fails with `NotFound` if absent.
    fn delete(&self, id: Uuid) -> impl Future<Output = LocalAuthResult<()>> + Send;
    /// All tenants, newest first.
    fn list(&self) -> impl Future<Output = LocalAuthResult<Vec<Tenant>>> + Send;
}

// ---------------------------------------------------------------------------
// Per-tenant user store
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    /// Insert a user. A duplicate email or username fails with
    /// `AlreadyExists` from the storage-level unique constraint.
    fn create(&self, input: CreateUser) -> impl Future<Output = LocalAuthResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LocalAuthResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = LocalAuthResult<User>> + Send;
    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = LocalAuthResult<User>> + Send;
    /// Apply a partial update and refresh `updated_at`.
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = LocalAuthResult<User>> + Send;
    fn record_sign_in(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> impl Future<Output = LocalAuthResult<()>> + Send;
    /// Fails with `NotFound` if no row was deleted.
    fn delete(&self, id: Uuid) -> impl Future<Output = LocalAuthResult<()>> + Send;
    /// All users, newest first.
    fn list(&self) -> impl Future<Output = LocalAuthResult<Vec<User>>> + Send;
    fn count(&self) -> impl Future<Output = LocalAuthResult<u64>> + Send;
}

/// Owner of the per-tenant stores.
///
/// `open` returns a handle to the tenant's store, creating it on first
/// use. `destroy` closes the store and deletes everything it left on
/// disk; destroying a store that was never created is a no-op.
pub trait TenantStoreProvider: Send + Sync {
    type Users: UserRepository;

    fn open(&self, tenant_id: Uuid) -> LocalAuthResult<Self::Users>;
    fn destroy(&self, tenant_id: Uuid) -> LocalAuthResult<()>;
}

// ---------------------------------------------------------------------------
// Shared handles
// ---------------------------------------------------------------------------

impl<T: TenantRepository> TenantRepository for Arc<T> {
    fn create(&self, input: CreateTenant) -> impl Future<Output = LocalAuthResult<Tenant>> + Send {
        (**self).create(input)
    }
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LocalAuthResult<Tenant>> + Send {
        (**self).get_by_id(id)
    }
    fn get_by_api_key(
        &self,
        api_key: &str,
    ) -> impl Future<Output = LocalAuthResult<Tenant>> + Send {
        (**self).get_by_api_key(api_key)
    }
    fn update(
        &self,
        id: Uuid,
        input: UpdateTenant,
    ) -> impl Future<Output = LocalAuthResult<Tenant>> + Send {
        (**self).update(id, input)
    }
    fn delete(&self, id: Uuid) -> impl Future<Output = LocalAuthResult<()>> + Send {
        (**self).delete(id)
    }
    fn list(&self) -> impl Future<Output = LocalAuthResult<Vec<Tenant>>> + Send {
        (**self).list()
    }
}

impl<T: TenantStoreProvider> TenantStoreProvider for Arc<T> {
    type Users = T::Users;

    fn open(&self, tenant_id: Uuid) -> LocalAuthResult<Self::Users> {
        (**self).open(tenant_id)
    }

    fn destroy(&self, tenant_id: Uuid) -> LocalAuthResult<()> {
        (**self).destroy(tenant_id)
    }
}
