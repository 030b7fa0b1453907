//! SQLite implementation of [`TenantRepository`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use localauth_core::error::LocalAuthResult;
use localauth_core::models::tenant::{CreateTenant, Tenant, UpdateTenant};
use localauth_core::repository::TenantRepository;
use rusqlite::types::ToSql;
use rusqlite::{OptionalExtension, Row};
use tracing::info;
use uuid::Uuid;

use crate::connection::{DbConfig, SqliteStore};
use crate::error::DbError;
use crate::keys;
use crate::schema::REGISTRY_MIGRATIONS;

const TENANT_COLUMNS: &str =
    "id, name, description, api_key, secret_key, created_at, updated_at";

/// DB-side row struct; the id is kept as text until validated.
struct TenantRow {
    id: String,
    name: String,
    description: String,
    api_key: String,
    secret_key: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            api_key: row.get(3)?,
            secret_key: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn try_into_tenant(self) -> Result<Tenant, DbError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| DbError::Corrupt(format!("invalid app UUID: {e}")))?;
        Ok(Tenant {
            id,
            name: self.name,
            description: self.description,
            api_key: self.api_key,
            signing_secret: self.secret_key,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// The tenant registry, backed by one shared SQLite database.
#[derive(Clone, Debug)]
pub struct SqliteTenantRepository {
    store: Arc<SqliteStore>,
}

impl SqliteTenantRepository {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }

    /// Open the registry at `<data_dir>/main.sqlite`, creating the data
    /// directory if needed.
    pub fn open(config: &DbConfig) -> Result<Self, DbError> {
        std::fs::create_dir_all(&config.data_dir)?;
        let store = SqliteStore::open(&config.registry_path(), REGISTRY_MIGRATIONS)?;
        Ok(Self::new(Arc::new(store)))
    }

    /// In-memory registry (for testing).
    pub fn in_memory() -> Result<Self, DbError> {
        let store = SqliteStore::open_in_memory(REGISTRY_MIGRATIONS)?;
        Ok(Self::new(Arc::new(store)))
    }

    fn select_one(&self, filter: &str, value: &str, what: &str) -> Result<Tenant, DbError> {
        let sql = format!("SELECT {TENANT_COLUMNS} FROM apps WHERE {filter} = ?1");
        let row = self.store.with_conn(|conn| {
            Ok(conn
                .query_row(&sql, [value], TenantRow::from_row)
                .optional()?)
        })?;
        row.ok_or_else(|| DbError::NotFound {
            entity: "app".into(),
            id: what.to_string(),
        })?
        .try_into_tenant()
    }
}

impl TenantRepository for SqliteTenantRepository {
    async fn create(&self, input: CreateTenant) -> LocalAuthResult<Tenant> {
        let now = Utc::now();
        let tenant = Tenant {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description.unwrap_or_default(),
            api_key: keys::generate_api_key(),
            signing_secret: keys::generate_signing_secret(),
            created_at: now,
            updated_at: now,
        };

        self.store.with_conn(|conn| {
            conn.execute(
                "INSERT INTO apps (id, name, description, api_key, secret_key, \
                 created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                (
                    tenant.id.to_string(),
                    &tenant.name,
                    &tenant.description,
                    &tenant.api_key,
                    &tenant.signing_secret,
                    tenant.created_at,
                    tenant.updated_at,
                ),
            )?;
            Ok(())
        })?;

        info!(tenant_id = %tenant.id, name = %tenant.name, "Registered app");
        Ok(tenant)
    }

    async fn get_by_id(&self, id: Uuid) -> LocalAuthResult<Tenant> {
        let id_str = id.to_string();
        Ok(self.select_one("id", &id_str, &id_str)?)
    }

    async fn get_by_api_key(&self, api_key: &str) -> LocalAuthResult<Tenant> {
        // Keys are credentials; never echo them into errors.
        Ok(self.select_one("api_key", api_key, "api_key=<redacted>")?)
    }

    async fn update(&self, id: Uuid, input: UpdateTenant) -> LocalAuthResult<Tenant> {
        let id_str = id.to_string();
        let now = Utc::now();

        let mut sets = Vec::new();
        let mut params: Vec<(&str, &dyn ToSql)> =
            vec![(":id", &id_str as &dyn ToSql), (":now", &now as &dyn ToSql)];
        if let Some(name) = &input.name {
            sets.push("name = :name");
            params.push((":name", name as &dyn ToSql));
        }
        if let Some(description) = &input.description {
            sets.push("description = :description");
            params.push((":description", description as &dyn ToSql));
        }
        sets.push("updated_at = :now");

        let sql = format!("UPDATE apps SET {} WHERE id = :id", sets.join(", "));
        let changed = self
            .store
            .with_conn(|conn| Ok(conn.execute(&sql, params.as_slice())?))?;
        if changed == 0 {
            return Err(DbError::NotFound {
                entity: "app".into(),
                id: id_str,
            }
            .into());
        }

        Ok(self.select_one("id", &id_str, &id_str)?)
    }

    async fn delete(&self, id: Uuid) -> LocalAuthResult<()> {
        let id_str = id.to_string();
        let changed = self
            .store
            .with_conn(|conn| Ok(conn.execute("DELETE FROM apps WHERE id = ?1", [&id_str])?))?;
        if changed == 0 {
            return Err(DbError::NotFound {
                entity: "app".into(),
                id: id_str,
            }
            .into());
        }

        info!(tenant_id = %id, "Removed app from registry");
        Ok(())
    }

    async fn list(&self) -> LocalAuthResult<Vec<Tenant>> {
        let sql = format!(
            "SELECT {TENANT_COLUMNS} FROM apps ORDER BY created_at DESC, rowid DESC"
        );
        let rows = self.store.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], TenantRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        Ok(rows
            .into_iter()
            .map(TenantRow::try_into_tenant)
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
