//! Tenant ("app") domain model.
//!
//! A tenant is an isolated identity domain. It owns a public API key used
//! to route credential requests, a private signing secret used for its
//! session tokens, and a dedicated user store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix of every public API key.
pub const API_KEY_PREFIX: &str = "la_";

/// Prefix of every private signing secret.
pub const SIGNING_SECRET_PREFIX: &str = "sk_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Public key presented by consuming applications in `x-api-key`.
    pub api_key: String,
    /// Private HMAC key for session tokens. Only ever shown on the
    /// admin surface.
    #[serde(rename = "secret_key")]
    pub signing_secret: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tenant as listed on the admin surface, with its live user count.
#[derive(Debug, Clone, Serialize)]
pub struct TenantSummary {
    #[serde(flatten)]
    pub tenant: Tenant,
    pub user_count: u64,
}

/// Fields required to register a tenant. The id, API key and signing
/// secret are generated by the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub name: String,
    pub description: Option<String>,
}

/// Fields that can be changed on an existing tenant.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTenant {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateTenant {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}
