//! Credential service: signup, signin and profile orchestration for
//! tenant users.

use std::sync::OnceLock;

use chrono::Utc;
use localauth_core::error::{LocalAuthError, LocalAuthResult};
use localauth_core::models::user::{CreateUser, UpdateUser, User, UserProfile};
use localauth_core::repository::{TenantStoreProvider, UserRepository};
use tracing::{debug, info};
use uuid::Uuid;

use crate::authenticator::TenantContext;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token::SessionService;

/// Input for the signup flow. Required fields are plain strings; an
/// empty email or password counts as missing.
#[derive(Debug, Default)]
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Input for the signin flow.
#[derive(Debug, Default)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// A user together with a freshly issued session token.
#[derive(Debug)]
pub struct AuthSession {
    pub user: UserProfile,
    pub token: String,
}

/// Credential service.
///
/// Generic over the store provider so the auth layer has no dependency
/// on the database crate.
pub struct CredentialService<S: TenantStoreProvider> {
    stores: S,
    sessions: SessionService,
    config: AuthConfig,
    /// Hash checked against when the email is unknown, so a miss costs
    /// the same as a wrong password.
    dummy_hash: OnceLock<String>,
}

impl<S: TenantStoreProvider> CredentialService<S> {
    pub fn new(stores: S, config: AuthConfig) -> Self {
        Self {
            stores,
            sessions: SessionService::new(config.session_lifetime_secs),
            config,
            dummy_hash: OnceLock::new(),
        }
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    /// Register a user in the tenant's store and issue a session token.
    pub async fn sign_up(
        &self,
        tenant: &TenantContext,
        input: SignUpInput,
    ) -> LocalAuthResult<AuthSession> {
        if input.email.is_empty() || input.password.is_empty() {
            return Err(LocalAuthError::validation("Email and password are required"));
        }
        let username = input.username.filter(|u| !u.is_empty());

        let users = self.stores.open(tenant.tenant_id)?;

        // Friendly early conflicts. The unique constraints in the store
        // remain the authority when two signups race past these checks.
        ensure_absent(users.get_by_email(&input.email).await, "email")?;
        if let Some(username) = &username {
            ensure_absent(users.get_by_username(username).await, "username")?;
        }

        let password_hash = password::hash_password(
            &input.password,
            &self.config.password_hash,
            self.config.pepper.as_deref(),
        )?;

        let user = users
            .create(CreateUser {
                email: input.email,
                username,
                password_hash,
                full_name: input.full_name.unwrap_or_default(),
                phone: input.phone.unwrap_or_default(),
                metadata: input
                    .metadata
                    .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            })
            .await?;

        let token = self
            .sessions
            .issue(&tenant.signing_secret, user.id, tenant.tenant_id)?;

        info!(tenant_id = %tenant.tenant_id, user_id = %user.id, "User signed up");
        Ok(AuthSession {
            user: user.into(),
            token,
        })
    }

    /// Check email + password, stamp `last_sign_in`, and issue a token.
    ///
    /// An unknown email and a wrong password both fail with
    /// [`AuthError::InvalidCredentials`].
    pub async fn sign_in(
        &self,
        tenant: &TenantContext,
        input: SignInInput,
    ) -> LocalAuthResult<AuthSession> {
        if input.email.is_empty() || input.password.is_empty() {
            return Err(LocalAuthError::validation("Email and password are required"));
        }

        let users = self.stores.open(tenant.tenant_id)?;
        let mut user = match users.get_by_email(&input.email).await {
            Ok(user) => user,
            Err(LocalAuthError::NotFound { .. }) => {
                self.burn_verification(&input.password)?;
                debug!(tenant_id = %tenant.tenant_id, "Signin for unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            debug!(tenant_id = %tenant.tenant_id, user_id = %user.id, "Signin with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let now = Utc::now();
        users.record_sign_in(user.id, now).await?;
        user.last_sign_in = Some(now);

        let token = self
            .sessions
            .issue(&tenant.signing_secret, user.id, tenant.tenant_id)?;

        info!(tenant_id = %tenant.tenant_id, user_id = %user.id, "User signed in");
        Ok(AuthSession {
            user: user.into(),
            token,
        })
    }

    /// Fetch a user's profile from the tenant's store.
    pub async fn get_user(&self, tenant_id: Uuid, user_id: Uuid) -> LocalAuthResult<UserProfile> {
        let users = self.stores.open(tenant_id)?;
        Ok(users.get_by_id(user_id).await?.into())
    }

    /// Apply a partial profile update. Fails with a validation error if
    /// no field was supplied; a username already held by another user of
    /// the same tenant is a conflict.
    pub async fn update_profile(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        input: UpdateUser,
    ) -> LocalAuthResult<UserProfile> {
        if input.is_empty() {
            return Err(LocalAuthError::validation("No fields to update"));
        }

        let users = self.stores.open(tenant_id)?;
        if let Some(username) = input.username.as_deref().filter(|u| !u.is_empty()) {
            match users.get_by_username(username).await {
                Ok(other) if other.id != user_id => {
                    return Err(conflict("username"));
                }
                Ok(_) | Err(LocalAuthError::NotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        let user = users.update(user_id, input).await?;
        debug!(tenant_id = %tenant_id, user_id = %user_id, "Profile updated");
        Ok(user.into())
    }

    fn burn_verification(&self, password: &str) -> LocalAuthResult<()> {
        let hash = match self.dummy_hash.get() {
            Some(hash) => hash,
            None => {
                let hash = password::hash_password(
                    "localauth-dummy-password",
                    &self.config.password_hash,
                    None,
                )?;
                self.dummy_hash.get_or_init(|| hash)
            }
        };
        password::verify_password(password, hash, self.config.pepper.as_deref())?;
        Ok(())
    }
}

fn conflict(field: &str) -> LocalAuthError {
    LocalAuthError::AlreadyExists {
        entity: "user".into(),
        field: field.into(),
    }
}

fn ensure_absent(lookup: LocalAuthResult<User>, field: &str) -> LocalAuthResult<()> {
    match lookup {
        Ok(_) => Err(conflict(field)),
        Err(LocalAuthError::NotFound { .. }) => Ok(()),
        Err(e) => Err(e),
    }
}
