//! SQLite connection management.
//!
//! Every store is a single SQLite file opened in WAL mode. A
//! [`SqliteStore`] owns exactly one connection behind a mutex; all
//! statements against that store are serialized through it.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::Connection;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbError;
use crate::schema::{Migration, run_migrations};

/// Where the registry and tenant stores live on disk.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub data_dir: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl DbConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Path of the shared tenant registry.
    pub fn registry_path(&self) -> PathBuf {
        self.data_dir.join("main.sqlite")
    }

    /// Path of a tenant's primary store file. SQLite places its `-wal`
    /// and `-shm` companions next to it.
    pub fn tenant_store_path(&self, tenant_id: Uuid) -> PathBuf {
        self.data_dir.join(format!("app_{tenant_id}.sqlite"))
    }
}

/// A single open SQLite database.
pub struct SqliteStore {
    conn: Mutex<Option<Connection>>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path`, switch it to WAL
    /// and apply any pending migrations.
    pub fn open(path: &Path, migrations: &[Migration]) -> Result<Self, DbError> {
        debug!(path = %path.display(), "Opening SQLite store");
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(path = %path.display(), journal_mode = %mode, "Journal mode set");
        conn.pragma_update(None, "foreign_keys", "ON")?;
        run_migrations(&conn, migrations)?;

        Ok(Self {
            conn: Mutex::new(Some(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// In-memory database (for testing).
    pub fn open_in_memory(migrations: &[Migration]) -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn, migrations)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            path: None,
        })
    }

    /// Run `f` against the connection. Fails with [`DbError::Closed`] once
    /// the store has been closed.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, DbError>,
    ) -> Result<T, DbError> {
        let guard = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        let conn = guard.as_ref().ok_or(DbError::Closed)?;
        f(conn)
    }

    /// Close the connection. Later calls to [`with_conn`](Self::with_conn)
    /// fail; closing twice is a no-op.
    pub fn close(&self) -> Result<(), DbError> {
        let mut guard = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        if let Some(conn) = guard.take() {
            conn.close().map_err(|(_, e)| DbError::Sqlite(e))?;
            if let Some(path) = &self.path {
                info!(path = %path.display(), "Closed SQLite store");
            }
        }
        Ok(())
    }
}
