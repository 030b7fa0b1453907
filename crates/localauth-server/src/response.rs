//! Response bodies.

use chrono::{DateTime, Utc};
use localauth_core::models::tenant::TenantSummary;
use localauth_core::models::user::UserProfile;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AppResponse {
    pub app: TenantSummary,
}

#[derive(Debug, Serialize)]
pub struct AppsResponse {
    pub apps: Vec<TenantSummary>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserProfile>,
}

/// A user plus the session token just issued for them.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserProfile,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub const OK: Self = Self { success: true };
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}
