//! Schema definitions and migration runner.
//!
//! Each database records the migrations it has applied in `_migration`,
//! so opening an existing store is idempotent. UUIDs and timestamps are
//! stored as text.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
CREATE TABLE IF NOT EXISTS _migration (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL
);";

pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

// -----------------------------------------------------------------------
// Registry schema: one shared database listing every tenant
// -----------------------------------------------------------------------

pub static REGISTRY_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "apps",
    sql: REGISTRY_SCHEMA_V1,
}];

const REGISTRY_SCHEMA_V1: &str = "\
CREATE TABLE IF NOT EXISTS apps (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    api_key TEXT NOT NULL,
    secret_key TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_apps_api_key ON apps (api_key);
CREATE INDEX IF NOT EXISTS idx_apps_created_at ON apps (created_at);
";

// -----------------------------------------------------------------------
// Tenant store schema: one database per tenant
// -----------------------------------------------------------------------

pub static TENANT_STORE_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "users",
    sql: TENANT_STORE_SCHEMA_V1,
}];

const TENANT_STORE_SCHEMA_V1: &str = "\
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    username TEXT UNIQUE,
    password_hash TEXT NOT NULL,
    full_name TEXT NOT NULL DEFAULT '',
    phone TEXT NOT NULL DEFAULT '',
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    last_sign_in TEXT
);
CREATE INDEX IF NOT EXISTS idx_users_created_at ON users (created_at);
";

/// Apply every migration in `migrations` not yet recorded in
/// `_migration`, each in its own transaction.
pub fn run_migrations(conn: &Connection, migrations: &[Migration]) -> Result<(), DbError> {
    conn.execute_batch(MIGRATION_TABLE_DDL)
        .map_err(|e| DbError::Migration(format!("migration table: {e}")))?;

    for migration in migrations {
        let applied: Option<u32> = conn
            .query_row(
                "SELECT version FROM _migration WHERE version = ?1",
                [migration.version],
                |row| row.get(0),
            )
            .optional()?;
        if applied.is_some() {
            continue;
        }

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.sql).map_err(|e| {
            DbError::Migration(format!(
                "v{} ({}) failed: {e}",
                migration.version, migration.name
            ))
        })?;
        tx.execute(
            "INSERT INTO _migration (version, name, applied_at) VALUES (?1, ?2, ?3)",
            (migration.version, migration.name, Utc::now()),
        )?;
        tx.commit()?;

        info!(
            version = migration.version,
            name = migration.name,
            "Applied migration"
        );
    }

    Ok(())
}
