//! HTTP surface: auth endpoints, app CRUD, and the admin route guard.

pub mod apps;
pub mod auth;
pub mod errors;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::storage::BlobStore;
use axum::routing::{get, post, put};
use axum::{middleware, Router};
use std::sync::Arc;

pub use errors::ApiError;

/// Application state shared across handlers
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<Catalog>,
    pub icons: Arc<dyn BlobStore>,
}

/// Build the full router. Routes:
///
///   GET  /health
///   POST /api/auth/login
///   POST /api/auth/logout
///   GET  /api/auth/check
///   GET  /api/apps
///   POST   /admin/api/apps
///   PUT    /admin/api/apps/{id}
///   DELETE /admin/api/apps/{id}
///   POST   /admin/api/apps/{id}/move
///   POST   /admin/api/apps/normalize
///   POST   /admin/api/icons
///   DELETE /admin/api/icons
///
/// The session guard layers the whole router but only intercepts paths
/// under `/admin`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(apps::health_check))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/check", get(auth::check))
        .route("/api/apps", get(apps::list_apps))
        .route("/admin/api/apps", post(apps::add_app))
        .route(
            "/admin/api/apps/:id",
            put(apps::update_app).delete(apps::delete_app),
        )
        .route("/admin/api/apps/:id/move", post(apps::move_app))
        .route("/admin/api/apps/normalize", post(apps::normalize_orders))
        .route(
            "/admin/api/icons",
            post(apps::upload_icon).delete(apps::delete_icon),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth::guard))
        .with_state(state)
}
