//! Integration tests for the tenant registry.

use localauth_core::error::LocalAuthError;
use localauth_core::models::tenant::{CreateTenant, UpdateTenant};
use localauth_core::repository::TenantRepository;
use localauth_db::DbConfig;
use localauth_db::repository::SqliteTenantRepository;
use uuid::Uuid;

fn create_input(name: &str) -> CreateTenant {
    CreateTenant {
        name: name.into(),
        description: None,
    }
}

#[tokio::test]
async fn create_and_get_tenant() {
    let repo = SqliteTenantRepository::in_memory().unwrap();

    let tenant = repo
        .create(CreateTenant {
            name: "Acme".into(),
            description: Some("Acme test app".into()),
        })
        .await
        .unwrap();

    assert_eq!(tenant.name, "Acme");
    assert_eq!(tenant.description, "Acme test app");
    assert!(tenant.api_key.starts_with("la_"));
    assert!(tenant.signing_secret.starts_with("sk_"));
    assert!(!tenant.api_key.contains(&tenant.id.simple().to_string()));

    let fetched = repo.get_by_id(tenant.id).await.unwrap();
    assert_eq!(fetched.id, tenant.id);
    assert_eq!(fetched.api_key, tenant.api_key);
    assert_eq!(fetched.signing_secret, tenant.signing_secret);
}

#[tokio::test]
async fn description_defaults_to_empty() {
    let repo = SqliteTenantRepository::in_memory().unwrap();
    let tenant = repo.create(create_input("No description")).await.unwrap();
    assert_eq!(tenant.description, "");
}

#[tokio::test]
async fn lookup_by_api_key() {
    let repo = SqliteTenantRepository::in_memory().unwrap();
    let a = repo.create(create_input("A")).await.unwrap();
    let b = repo.create(create_input("B")).await.unwrap();

    assert_ne!(a.api_key, b.api_key);
    assert_ne!(a.signing_secret, b.signing_secret);

    let found = repo.get_by_api_key(&b.api_key).await.unwrap();
    assert_eq!(found.id, b.id);

    let err = repo.get_by_api_key("la_unknown").await.unwrap_err();
    assert!(err.is_not_found());
    // The presented key must not leak into the error.
    assert!(!err.to_string().contains("la_unknown"));
}

#[tokio::test]
async fn list_is_newest_first() {
    let repo = SqliteTenantRepository::in_memory().unwrap();
    let first = repo.create(create_input("first")).await.unwrap();
    let second = repo.create(create_input("second")).await.unwrap();
    let third = repo.create(create_input("third")).await.unwrap();

    let ids: Vec<Uuid> = repo.list().await.unwrap().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);
}

#[tokio::test]
async fn update_name_and_description() {
    let repo = SqliteTenantRepository::in_memory().unwrap();
    let tenant = repo.create(create_input("Old")).await.unwrap();

    let updated = repo
        .update(
            tenant.id,
            UpdateTenant {
                name: Some("New".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "New");
    assert_eq!(updated.description, "");
    assert_eq!(updated.api_key, tenant.api_key);
    assert!(updated.updated_at >= tenant.updated_at);

    let err = repo
        .update(Uuid::new_v4(), UpdateTenant::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn delete_removes_row() {
    let repo = SqliteTenantRepository::in_memory().unwrap();
    let tenant = repo.create(create_input("Doomed")).await.unwrap();

    repo.delete(tenant.id).await.unwrap();

    assert!(repo.get_by_id(tenant.id).await.unwrap_err().is_not_found());
    assert!(repo.list().await.unwrap().is_empty());
    assert!(matches!(
        repo.delete(tenant.id).await,
        Err(LocalAuthError::NotFound { .. })
    ));
}

#[tokio::test]
async fn registry_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path().join("nested"));

    let id = {
        let repo = SqliteTenantRepository::open(&config).unwrap();
        repo.create(create_input("Persistent")).await.unwrap().id
    };

    let repo = SqliteTenantRepository::open(&config).unwrap();
    let tenant = repo.get_by_id(id).await.unwrap();
    assert_eq!(tenant.name, "Persistent");
    assert!(config.registry_path().exists());
}
