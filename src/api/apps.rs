//! App catalog handlers: the public list plus the admin CRUD surface.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use super::errors::ApiError;
use super::AppState;
use crate::catalog::Direction;
use crate::types::{AppDraft, AppPatch, AppRecord, Zone};

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    /// Restrict to one audience zone; `both` records always match.
    pub zone: Option<Zone>,
    /// Bypass the snapshot cache (the portal's refresh button).
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Serialize)]
pub struct AppsResponse {
    success: bool,
    apps: Vec<AppRecord>,
}

#[derive(Serialize)]
pub struct AddedResponse {
    success: bool,
    id: String,
}

#[derive(Serialize)]
pub struct OkResponse {
    success: bool,
}

#[derive(Deserialize)]
pub struct MoveRequest {
    pub direction: Direction,
}

#[derive(Debug, Deserialize)]
pub struct IconUploadQuery {
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct IconDeleteQuery {
    pub url: String,
}

#[derive(Serialize)]
pub struct IconResponse {
    success: bool,
    url: String,
}

/// GET /api/apps — the portal's list read, through the catalog cache.
pub async fn list_apps(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<AppsResponse>, ApiError> {
    let apps = state
        .catalog
        .list(query.refresh)
        .await
        .map_err(|_| ApiError::FetchFailed)?;

    let apps = match query.zone {
        Some(zone) => apps.into_iter().filter(|a| a.zone.visible_to(zone)).collect(),
        None => apps,
    };

    Ok(Json(AppsResponse {
        success: true,
        apps,
    }))
}

/// POST /admin/api/apps — add an app at the end of the display order.
pub async fn add_app(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<AppDraft>,
) -> Result<(StatusCode, Json<AddedResponse>), ApiError> {
    let id = state.catalog.add(draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(AddedResponse { success: true, id }),
    ))
}

/// PUT /admin/api/apps/{id} — partial update.
pub async fn update_app(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<AppPatch>,
) -> Result<Json<OkResponse>, ApiError> {
    state.catalog.update(&id, patch).await?;
    Ok(Json(OkResponse { success: true }))
}

/// DELETE /admin/api/apps/{id} — delete the record, then release its
/// icon from the blob store. Icon release is best-effort: a stray file
/// is not worth failing a completed delete for.
pub async fn delete_app(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiError> {
    let icon_url = state.catalog.get(&id).await?.map(|app| app.icon_url);

    state.catalog.remove(&id).await?;

    if let Some(url) = icon_url {
        if let Err(e) = state.icons.delete(&url).await {
            warn!("Could not release icon for deleted app {}: {}", id, e);
        }
    }

    Ok(Json(OkResponse { success: true }))
}

/// POST /admin/api/apps/{id}/move — one step up or down.
pub async fn move_app(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<MoveRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    state.catalog.move_app(&id, body.direction).await?;
    Ok(Json(OkResponse { success: true }))
}

/// POST /admin/api/apps/normalize — repair order drift.
pub async fn normalize_orders(State(state): State<Arc<AppState>>) -> Json<OkResponse> {
    state.catalog.normalize_orders().await;
    Json(OkResponse { success: true })
}

/// POST /admin/api/icons?filename=... — store an uploaded icon, body is
/// the raw image bytes.
pub async fn upload_icon(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IconUploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<IconResponse>, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    let url = state
        .icons
        .upload(body, content_type, &query.filename)
        .await?;

    Ok(Json(IconResponse { success: true, url }))
}

/// DELETE /admin/api/icons?url=... — remove an uploaded icon. Foreign
/// URLs are ignored by the blob store.
pub async fn delete_icon(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IconDeleteQuery>,
) -> Result<Json<OkResponse>, ApiError> {
    state.icons.delete(&query.url).await?;
    Ok(Json(OkResponse { success: true }))
}

/// GET /health — liveness probe.
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
