//! Tenant user domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user row inside one tenant's store. Ids, emails and usernames are
/// only unique within that store.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub full_name: String,
    pub phone: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_sign_in: Option<DateTime<Utc>>,
}

/// Outward-facing projection of a [`User`]; never carries the hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub full_name: String,
    pub phone: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_sign_in: Option<DateTime<Utc>>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            full_name: user.full_name,
            phone: user.phone,
            metadata: user.metadata,
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_sign_in: user.last_sign_in,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub username: Option<String>,
    /// Already hashed; storage never sees the raw password.
    pub password_hash: String,
    pub full_name: String,
    pub phone: String,
    pub metadata: serde_json::Value,
}

/// Partial profile update. `None` leaves a field untouched; `Some("")`
/// is a real update to the empty string (for `username`, it clears it).
/// An explicit `"metadata": null` is an update to JSON `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub username: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub metadata: Option<serde_json::Value>,
}

/// Any value that is present, `null` included, becomes `Some`.
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.phone.is_none()
            && self.username.is_none()
            && self.metadata.is_none()
    }
}
