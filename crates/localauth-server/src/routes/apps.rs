//! Admin surface: tenant and user management.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use localauth_core::models::tenant::{CreateTenant, UpdateTenant};
use serde::Deserialize;

use super::parse_id;
use crate::error::ApiResult;
use crate::response::{AppResponse, AppsResponse, SuccessResponse, UsersResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateAppRequest {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAppRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub async fn list_apps(State(state): State<AppState>) -> ApiResult<Json<AppsResponse>> {
    let apps = state.admin.list_tenants().await?;
    Ok(Json(AppsResponse { apps }))
}

pub async fn get_app(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AppResponse>> {
    let id = parse_id(&id, "App")?;
    let app = state.admin.get_tenant(id).await?;
    Ok(Json(AppResponse { app }))
}

pub async fn create_app(
    State(state): State<AppState>,
    payload: Result<Json<CreateAppRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AppResponse>)> {
    let Json(body) = payload?;
    let app = state
        .admin
        .create_tenant(CreateTenant {
            name: body.name.trim().to_owned(),
            description: body.description,
        })
        .await?;
    tracing::info!(tenant_id = %app.tenant.id, name = %app.tenant.name, "Created app");
    Ok((StatusCode::CREATED, Json(AppResponse { app })))
}

pub async fn update_app(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateAppRequest>, JsonRejection>,
) -> ApiResult<Json<AppResponse>> {
    let id = parse_id(&id, "App")?;
    let Json(body) = payload?;
    let app = state
        .admin
        .update_tenant(
            id,
            UpdateTenant {
                name: body.name.map(|n| n.trim().to_owned()),
                description: body.description,
            },
        )
        .await?;
    Ok(Json(AppResponse { app }))
}

pub async fn delete_app(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    let id = parse_id(&id, "App")?;
    state.admin.delete_tenant(id).await?;
    Ok(Json(SuccessResponse::OK))
}

pub async fn list_users(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UsersResponse>> {
    let id = parse_id(&id, "App")?;
    let users = state.admin.list_users(id).await?;
    Ok(Json(UsersResponse { users }))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(String, String)>,
) -> ApiResult<Json<SuccessResponse>> {
    let id = parse_id(&id, "App")?;
    let user_id = parse_id(&user_id, "User")?;
    state.admin.delete_user(id, user_id).await?;
    Ok(Json(SuccessResponse::OK))
}
