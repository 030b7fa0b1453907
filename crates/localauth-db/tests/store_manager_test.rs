//! Integration tests for the per-tenant store lifecycle.

use std::collections::HashSet;
use std::sync::Arc;

use localauth_core::models::user::CreateUser;
use localauth_core::repository::{TenantStoreProvider, UserRepository};
use localauth_db::{DbConfig, TenantStoreManager};
use serde_json::json;
use uuid::Uuid;

fn user(email: &str) -> CreateUser {
    CreateUser {
        email: email.into(),
        username: None,
        password_hash: "hash".into(),
        full_name: String::new(),
        phone: String::new(),
        metadata: json!({}),
    }
}

#[test]
fn open_is_cached_per_tenant() {
    let dir = tempfile::tempdir().unwrap();
    let manager = TenantStoreManager::new(DbConfig::new(dir.path())).unwrap();
    let tenant = Uuid::new_v4();

    assert!(!manager.is_open(tenant));
    let a = manager.open_store(tenant).unwrap();
    let b = manager.open_store(tenant).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(manager.is_open(tenant));

    let other = manager.open_store(Uuid::new_v4()).unwrap();
    assert!(!Arc::ptr_eq(&a, &other));
}

#[test]
fn concurrent_first_opens_share_one_handle() {
    let dir = tempfile::tempdir().unwrap();
    let manager = Arc::new(TenantStoreManager::new(DbConfig::new(dir.path())).unwrap());
    let tenant = Uuid::new_v4();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let manager = Arc::clone(&manager);
            std::thread::spawn(move || manager.open_store(tenant).unwrap())
        })
        .collect();
    let stores: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for store in &stores[1..] {
        assert!(Arc::ptr_eq(&stores[0], store));
    }
}

#[tokio::test]
async fn tenants_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let manager = TenantStoreManager::new(DbConfig::new(dir.path())).unwrap();
    let tenant_a = Uuid::new_v4();
    let tenant_b = Uuid::new_v4();

    let a = manager.open(tenant_a).unwrap();
    let b = manager.open(tenant_b).unwrap();

    // The same email may exist in two tenants.
    let in_a = a.create(user("same@example.com")).await.unwrap();
    let in_b = b.create(user("same@example.com")).await.unwrap();
    assert_ne!(in_a.id, in_b.id);

    // And a row in A is invisible from B.
    assert!(b.get_by_id(in_a.id).await.unwrap_err().is_not_found());
    assert_eq!(b.get_by_email("same@example.com").await.unwrap().id, in_b.id);
    assert_eq!(a.count().await.unwrap(), 1);
    assert_eq!(b.count().await.unwrap(), 1);
}

#[tokio::test]
async fn destroy_removes_files_and_reopen_is_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path());
    let manager = TenantStoreManager::new(config.clone()).unwrap();
    let tenant = Uuid::new_v4();

    let users = manager.open(tenant).unwrap();
    users.create(user("gone@example.com")).await.unwrap();
    let path = config.tenant_store_path(tenant);
    assert!(path.exists());

    manager.destroy(tenant).unwrap();
    assert!(!manager.is_open(tenant));
    for suffix in ["", "-wal", "-shm"] {
        let mut p = path.clone().into_os_string();
        p.push(suffix);
        assert!(!std::path::Path::new(&p).exists(), "{p:?} survived destroy");
    }

    // The old handle is dead, not silently writing to a deleted file.
    assert!(users.count().await.is_err());

    let fresh = manager.open(tenant).unwrap();
    assert_eq!(fresh.count().await.unwrap(), 0);
    assert!(fresh.get_by_email("gone@example.com").await.is_err());
}

#[test]
fn destroy_of_unknown_tenant_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let manager = TenantStoreManager::new(DbConfig::new(dir.path())).unwrap();
    manager.destroy(Uuid::new_v4()).unwrap();
}

#[test]
fn sweep_removes_only_unknown_stores() {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path());
    let manager = TenantStoreManager::new(config.clone()).unwrap();
    let kept = Uuid::new_v4();
    let orphan = Uuid::new_v4();

    manager.open_store(kept).unwrap();
    manager.open_store(orphan).unwrap();

    let known: HashSet<Uuid> = [kept].into_iter().collect();
    let removed = manager.sweep_orphans(&known).unwrap();

    assert_eq!(removed, vec![orphan]);
    assert!(config.tenant_store_path(kept).exists());
    assert!(!config.tenant_store_path(orphan).exists());
    assert!(manager.is_open(kept));
    assert!(!manager.is_open(orphan));
}
