//! Per-tenant store lifecycle.
//!
//! Every tenant gets its own SQLite file. [`TenantStoreManager`] is the
//! only owner of the open handles: it opens a store on first use, caches
//! the handle for the life of the process, and on `destroy` closes it and
//! deletes the file together with its `-wal` and `-shm` companions.
//!
//! Opens and destroys for one tenant id are serialized on that id's map
//! entry, so two concurrent first opens cannot produce two handles.
//! Lookups of already-open stores for other tenants only take a shard
//! read lock.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use localauth_core::error::LocalAuthResult;
use localauth_core::repository::TenantStoreProvider;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::connection::{DbConfig, SqliteStore};
use crate::error::DbError;
use crate::repository::SqliteUserRepository;
use crate::schema::TENANT_STORE_MIGRATIONS;

const STORE_FILE_SUFFIXES: [&str; 3] = ["", "-wal", "-shm"];

#[derive(Debug)]
pub struct TenantStoreManager {
    config: DbConfig,
    stores: DashMap<Uuid, Arc<SqliteStore>>,
}

impl TenantStoreManager {
    /// Create a manager rooted at `config.data_dir`, creating the
    /// directory if needed. No store is opened yet.
    pub fn new(config: DbConfig) -> Result<Self, DbError> {
        std::fs::create_dir_all(&config.data_dir)?;
        Ok(Self {
            config,
            stores: DashMap::new(),
        })
    }

    /// Return the cached handle for `tenant_id`, opening (and creating)
    /// the store if this is the first use.
    pub fn open_store(&self, tenant_id: Uuid) -> Result<Arc<SqliteStore>, DbError> {
        if let Some(store) = self.stores.get(&tenant_id) {
            return Ok(Arc::clone(store.value()));
        }

        let entry = self.stores.entry(tenant_id).or_try_insert_with(|| {
            let path = self.config.tenant_store_path(tenant_id);
            let store = SqliteStore::open(&path, TENANT_STORE_MIGRATIONS)?;
            info!(tenant_id = %tenant_id, path = %path.display(), "Opened tenant store");
            Ok::<_, DbError>(Arc::new(store))
        })?;
        Ok(Arc::clone(entry.value()))
    }

    /// Close any cached handle and delete every on-disk artifact of the
    /// tenant's store. Destroying a store that never existed succeeds.
    pub fn destroy_store(&self, tenant_id: Uuid) -> Result<(), DbError> {
        let path = self.config.tenant_store_path(tenant_id);

        // Keep the entry locked until the files are gone so a concurrent
        // open cannot recreate the store halfway through.
        match self.stores.entry(tenant_id) {
            Entry::Occupied(occupied) => {
                occupied.get().close()?;
                remove_store_files(&path)?;
                occupied.remove();
            }
            Entry::Vacant(_vacant) => {
                remove_store_files(&path)?;
            }
        }

        info!(tenant_id = %tenant_id, "Destroyed tenant store");
        Ok(())
    }

    /// Whether a handle for `tenant_id` is currently cached.
    pub fn is_open(&self, tenant_id: Uuid) -> bool {
        self.stores.contains_key(&tenant_id)
    }

    /// Destroy every store in the data directory whose tenant id is not in
    /// `known`. Returns the ids that were removed.
    ///
    /// Tenant deletion removes the registry row before the store, so a
    /// crash in between leaves an unreferenced store behind; this cleans
    /// those up at startup.
    pub fn sweep_orphans(&self, known: &HashSet<Uuid>) -> Result<Vec<Uuid>, DbError> {
        let mut orphans = HashSet::new();
        for entry in std::fs::read_dir(&self.config.data_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(tenant_id) = name.to_str().and_then(parse_store_file_name) else {
                continue;
            };
            if !known.contains(&tenant_id) {
                orphans.insert(tenant_id);
            }
        }

        let mut removed = Vec::with_capacity(orphans.len());
        for tenant_id in orphans {
            warn!(tenant_id = %tenant_id, "Removing orphaned tenant store");
            self.destroy_store(tenant_id)?;
            removed.push(tenant_id);
        }
        Ok(removed)
    }
}

impl TenantStoreProvider for TenantStoreManager {
    type Users = SqliteUserRepository;

    fn open(&self, tenant_id: Uuid) -> LocalAuthResult<Self::Users> {
        Ok(SqliteUserRepository::new(self.open_store(tenant_id)?))
    }

    fn destroy(&self, tenant_id: Uuid) -> LocalAuthResult<()> {
        Ok(self.destroy_store(tenant_id)?)
    }
}

fn remove_store_files(primary: &Path) -> Result<(), DbError> {
    for suffix in STORE_FILE_SUFFIXES {
        let mut path = primary.as_os_str().to_owned();
        path.push(suffix);
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(path = ?path, "Removed store file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// `app_<uuid>.sqlite`, optionally followed by `-wal` / `-shm`.
fn parse_store_file_name(name: &str) -> Option<Uuid> {
    let rest = name.strip_prefix("app_")?;
    let (id, suffix) = rest.split_once(".sqlite")?;
    if !STORE_FILE_SUFFIXES.contains(&suffix) {
        return None;
    }
    Uuid::parse_str(id).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_store_file_names() {
        let id = Uuid::new_v4();
        assert_eq!(parse_store_file_name(&format!("app_{id}.sqlite")), Some(id));
        assert_eq!(
            parse_store_file_name(&format!("app_{id}.sqlite-wal")),
            Some(id)
        );
        assert_eq!(parse_store_file_name("main.sqlite"), None);
        assert_eq!(parse_store_file_name("app_not-a-uuid.sqlite"), None);
        assert_eq!(
            parse_store_file_name(&format!("app_{id}.sqlite.bak")),
            None
        );
    }
}
