//! API key middleware for the credential surface.
//!
//! Resolves the `x-api-key` header to its tenant and stores the
//! resulting [`TenantContext`] in the request extensions. Requests
//! without a valid key never reach a handler.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use localauth_auth::TenantContext;

use crate::error::ApiResult;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

pub async fn require_api_key(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let api_key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let tenant: TenantContext = state.authenticator.authenticate(api_key.as_deref()).await?;
    tracing::debug!(tenant_id = %tenant.tenant_id, "Resolved API key");

    request.extensions_mut().insert(tenant);
    Ok(next.run(request).await)
}
