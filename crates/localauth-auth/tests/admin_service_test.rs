//! Integration tests for tenant administration.

use std::sync::Arc;

use localauth_auth::{
    ApiKeyAuthenticator, AuthConfig, CredentialService, PasswordHashParams, SignUpInput,
    TenantAdminService,
};
use localauth_core::error::LocalAuthError;
use localauth_core::models::tenant::{CreateTenant, UpdateTenant};
use localauth_db::repository::SqliteTenantRepository;
use localauth_db::{DbConfig, TenantStoreManager};
use tempfile::TempDir;
use uuid::Uuid;

type Registry = Arc<SqliteTenantRepository>;
type Stores = Arc<TenantStoreManager>;

struct Harness {
    dir: TempDir,
    stores: Stores,
    admin: TenantAdminService<Registry, Stores>,
    authenticator: ApiKeyAuthenticator<Registry>,
    credentials: CredentialService<Stores>,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path());
    let registry = Arc::new(SqliteTenantRepository::open(&config).unwrap());
    let stores = Arc::new(TenantStoreManager::new(config).unwrap());
    let auth_config = AuthConfig {
        password_hash: PasswordHashParams {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        },
        ..AuthConfig::default()
    };
    Harness {
        admin: TenantAdminService::new(Arc::clone(&registry), Arc::clone(&stores)),
        authenticator: ApiKeyAuthenticator::new(Arc::clone(&registry)),
        credentials: CredentialService::new(Arc::clone(&stores), auth_config),
        stores,
        dir,
    }
}

fn create(name: &str) -> CreateTenant {
    CreateTenant {
        name: name.into(),
        description: None,
    }
}

fn signup(email: &str) -> SignUpInput {
    SignUpInput {
        email: email.into(),
        password: "pw".into(),
        ..SignUpInput::default()
    }
}

#[tokio::test]
async fn create_initialises_store_eagerly() {
    let h = harness();
    let app = h.admin.create_tenant(create("Acme")).await.unwrap();

    assert_eq!(app.user_count, 0);
    assert_eq!(app.tenant.description, "");
    assert!(app.tenant.api_key.starts_with("la_"));
    assert!(app.tenant.signing_secret.starts_with("sk_"));
    assert!(h.stores.is_open(app.tenant.id));
    assert!(
        h.dir
            .path()
            .join(format!("app_{}.sqlite", app.tenant.id))
            .exists()
    );
}

#[tokio::test]
async fn blank_name_is_rejected() {
    let h = harness();
    let err = h.admin.create_tenant(create("   ")).await.unwrap_err();
    match err {
        LocalAuthError::Validation { message } => assert_eq!(message, "App name is required"),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(h.admin.list_tenants().await.unwrap().is_empty());
}

#[tokio::test]
async fn listing_reports_live_user_counts() {
    let h = harness();
    let acme = h.admin.create_tenant(create("Acme")).await.unwrap();
    let globex = h.admin.create_tenant(create("Globex")).await.unwrap();

    let ctx = h
        .authenticator
        .authenticate(Some(&acme.tenant.api_key))
        .await
        .unwrap();
    h.credentials.sign_up(&ctx, signup("a@x.io")).await.unwrap();
    h.credentials.sign_up(&ctx, signup("b@x.io")).await.unwrap();

    let apps = h.admin.list_tenants().await.unwrap();
    assert_eq!(apps.len(), 2);
    // Newest first.
    assert_eq!(apps[0].tenant.id, globex.tenant.id);
    assert_eq!(apps[0].user_count, 0);
    assert_eq!(apps[1].tenant.id, acme.tenant.id);
    assert_eq!(apps[1].user_count, 2);

    let single = h.admin.get_tenant(acme.tenant.id).await.unwrap();
    assert_eq!(single.user_count, 2);
}

#[tokio::test]
async fn update_changes_name_only() {
    let h = harness();
    let app = h.admin.create_tenant(create("Acme")).await.unwrap();

    let updated = h
        .admin
        .update_tenant(
            app.tenant.id,
            UpdateTenant {
                name: Some("Acme Corp".into()),
                description: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.tenant.name, "Acme Corp");
    assert_eq!(updated.tenant.api_key, app.tenant.api_key);

    let err = h
        .admin
        .update_tenant(Uuid::new_v4(), UpdateTenant {
            name: Some("x".into()),
            description: None,
        })
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn api_key_resolution() {
    let h = harness();
    let app = h.admin.create_tenant(create("Acme")).await.unwrap();

    let ctx = h
        .authenticator
        .authenticate(Some(&app.tenant.api_key))
        .await
        .unwrap();
    assert_eq!(ctx.tenant_id, app.tenant.id);
    assert_eq!(ctx.signing_secret, app.tenant.signing_secret);

    for key in [None, Some(""), Some("la_unknown")] {
        let err = h.authenticator.authenticate(key).await.unwrap_err();
        assert!(matches!(err, LocalAuthError::AuthenticationFailed { .. }));
    }
}

#[tokio::test]
async fn delete_tenant_removes_everything() {
    let h = harness();
    let app = h.admin.create_tenant(create("Acme")).await.unwrap();
    let ctx = h
        .authenticator
        .authenticate(Some(&app.tenant.api_key))
        .await
        .unwrap();
    h.credentials.sign_up(&ctx, signup("a@x.io")).await.unwrap();

    h.admin.delete_tenant(app.tenant.id).await.unwrap();

    let store_path = h.dir.path().join(format!("app_{}.sqlite", app.tenant.id));
    for suffix in ["", "-wal", "-shm"] {
        let mut path = store_path.clone().into_os_string();
        path.push(suffix);
        assert!(!std::path::Path::new(&path).exists());
    }
    assert!(!h.stores.is_open(app.tenant.id));

    let err = h
        .authenticator
        .authenticate(Some(&app.tenant.api_key))
        .await
        .unwrap_err();
    assert!(matches!(err, LocalAuthError::AuthenticationFailed { .. }));

    let err = h.admin.delete_tenant(app.tenant.id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn user_management() {
    let h = harness();
    let app = h.admin.create_tenant(create("Acme")).await.unwrap();
    let ctx = h
        .authenticator
        .authenticate(Some(&app.tenant.api_key))
        .await
        .unwrap();
    let first = h.credentials.sign_up(&ctx, signup("a@x.io")).await.unwrap();
    let second = h.credentials.sign_up(&ctx, signup("b@x.io")).await.unwrap();

    let users = h.admin.list_users(app.tenant.id).await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].id, second.user.id);

    h.admin
        .delete_user(app.tenant.id, first.user.id)
        .await
        .unwrap();
    let users = h.admin.list_users(app.tenant.id).await.unwrap();
    assert_eq!(users.len(), 1);

    let err = h
        .admin
        .delete_user(app.tenant.id, first.user.id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = h.admin.list_users(Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_not_found());
}
