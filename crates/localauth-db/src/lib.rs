//! LocalAuth Database: SQLite tenant registry and per-tenant user
//! stores.
//!
//! This crate provides:
//! - Connection management ([`DbConfig`], [`SqliteStore`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - The tenant registry ([`repository::SqliteTenantRepository`])
//! - The per-tenant store lifecycle ([`TenantStoreManager`])
//! - Error types ([`DbError`])

mod connection;
mod error;
pub mod keys;
pub mod repository;
mod schema;
mod store_manager;

pub use connection::{DbConfig, SqliteStore};
pub use error::DbError;
pub use schema::{Migration, REGISTRY_MIGRATIONS, TENANT_STORE_MIGRATIONS, run_migrations};
pub use store_manager::TenantStoreManager;
