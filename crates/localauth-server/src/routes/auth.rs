//! Credential surface: signup, signin, profile and signout.
//!
//! Every handler runs behind [`require_api_key`](crate::middleware::require_api_key)
//! and receives the resolved [`TenantContext`] as an extension.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};
use localauth_auth::token::extract_bearer_token;
use localauth_auth::{AuthError, SignInInput, SignUpInput, TenantContext};
use localauth_core::models::user::UpdateUser;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::response::{SessionResponse, SuccessResponse, UserResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn sign_up(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let Json(body) = payload?;
    let session = state
        .credentials
        .sign_up(
            &tenant,
            SignUpInput {
                email: body.email,
                password: body.password,
                username: body.username,
                full_name: body.full_name,
                phone: body.phone,
                metadata: body.metadata,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            user: session.user,
            token: session.token,
        }),
    ))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> ApiResult<Json<SessionResponse>> {
    let Json(body) = payload?;
    let session = state
        .credentials
        .sign_in(
            &tenant,
            SignInInput {
                email: body.email,
                password: body.password,
            },
        )
        .await?;

    Ok(Json(SessionResponse {
        user: session.user,
        token: session.token,
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    headers: HeaderMap,
) -> ApiResult<Json<UserResponse>> {
    let user_id = session_user(&state, &tenant, &headers)?;
    let user = state.credentials.get_user(tenant.tenant_id, user_id).await?;
    Ok(Json(UserResponse { user }))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    headers: HeaderMap,
    payload: Result<Json<UpdateUser>, JsonRejection>,
) -> ApiResult<Json<UserResponse>> {
    let user_id = session_user(&state, &tenant, &headers)?;
    let Json(update) = payload?;
    let user = state
        .credentials
        .update_profile(tenant.tenant_id, user_id, update)
        .await?;
    Ok(Json(UserResponse { user }))
}

/// Tokens are stateless; signing out is the client discarding its copy.
pub async fn sign_out() -> Json<SuccessResponse> {
    Json(SuccessResponse::OK)
}

/// Verify the bearer token against the request's tenant and return the
/// user it was issued to.
fn session_user(
    state: &AppState,
    tenant: &TenantContext,
    headers: &HeaderMap,
) -> ApiResult<Uuid> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_bearer_token)
        .ok_or(AuthError::MissingBearerToken)?;

    state
        .credentials
        .sessions()
        .authenticate(tenant, token)
        .map_err(|e| {
            tracing::debug!(tenant_id = %tenant.tenant_id, error = %e, "Rejected session token");
            ApiError::Unauthorized("Invalid or expired token".into())
        })
}
