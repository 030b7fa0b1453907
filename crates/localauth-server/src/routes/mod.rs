//! Router assembly.
//!
//! ```text
//! GET    /api/health
//! GET    /api/apps                      POST /api/apps
//! GET    /api/apps/{id}                 PATCH /api/apps/{id}   DELETE /api/apps/{id}
//! GET    /api/apps/{id}/users
//! DELETE /api/apps/{id}/users/{user_id}
//! POST   /api/auth/signup               POST /api/auth/signin
//! GET    /api/auth/me                   PUT  /api/auth/me
//! POST   /api/auth/signout
//! ```
//!
//! Everything under `/api/auth` requires `x-api-key`. The admin surface
//! is unauthenticated and must only be reachable locally.

pub mod apps;
pub mod auth;
pub mod health;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::require_api_key;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let app_routes = Router::new()
        .route("/", get(apps::list_apps).post(apps::create_app))
        .route(
            "/{id}",
            get(apps::get_app)
                .patch(apps::update_app)
                .delete(apps::delete_app),
        )
        .route("/{id}/users", get(apps::list_users))
        .route("/{id}/users/{user_id}", delete(apps::delete_user));

    let auth_routes = Router::new()
        .route("/signup", post(auth::sign_up))
        .route("/signin", post(auth::sign_in))
        .route("/me", get(auth::me).put(auth::update_me))
        .route("/signout", post(auth::sign_out))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    let api = Router::new()
        .route("/health", get(health::health_check))
        .nest("/apps", app_routes)
        .nest("/auth", auth_routes);

    let router = Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http());

    let router = if state.config.cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}

/// Ids in paths are parsed by hand so that a malformed id reads as an
/// unknown resource rather than a routing error.
fn parse_id(raw: &str, entity: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("{entity} not found")))
}
