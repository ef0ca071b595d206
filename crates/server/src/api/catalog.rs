//! Catalog API handlers.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use cinelinks_core::catalog::{RELATED_LIMIT, SUGGESTION_LIMIT};
use cinelinks_core::client::DownloadRecorded;
use cinelinks_core::{
    CatalogEntry, CatalogPage, CatalogStats, EntryFlag, FilterOptions, NewCatalogEntry,
    RawCatalogQuery, SearchSuggestion, SeriesEpisodes,
};

use super::error::ApiError;
use super::middleware::AuthUser;
use crate::metrics::{ADMIN_MUTATIONS_TOTAL, CATALOG_DOWNLOADS_TOTAL};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SuggestionParams {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub ok: bool,
}

// ============================================================================
// Public handlers
// ============================================================================

/// GET /api/v1/catalog
///
/// One page of active entries matching the filters.
pub async fn list_catalog(
    State(state): State<Arc<AppState>>,
    params: Result<Query<RawCatalogQuery>, QueryRejection>,
) -> Result<Json<CatalogPage>, ApiError> {
    let Query(params) = params?;
    let filter = params.resolve();
    Ok(Json(state.catalog().list(&filter)?))
}

/// GET /api/v1/catalog/{id}
///
/// A single entry, hidden or not.
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CatalogEntry>, ApiError> {
    Ok(Json(state.catalog().get(&id)?))
}

/// GET /api/v1/catalog/{id}/related
pub async fn related(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<CatalogEntry>>, ApiError> {
    Ok(Json(state.catalog().related(&id, RELATED_LIMIT)?))
}

/// GET /api/v1/catalog/{id}/episodes
///
/// Episode listing of a series; 400 for a movie.
pub async fn episodes(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SeriesEpisodes>, ApiError> {
    let entry = state.catalog().get(&id)?;
    Ok(Json(SeriesEpisodes::try_from(entry)?))
}

/// GET /api/v1/catalog/search-suggestions?q=
pub async fn search_suggestions(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SuggestionParams>, QueryRejection>,
) -> Result<Json<Vec<SearchSuggestion>>, ApiError> {
    let Query(params) = params?;
    let q = params.q.unwrap_or_default();
    Ok(Json(state.catalog().suggestions(&q, SUGGESTION_LIMIT)?))
}

/// POST /api/v1/catalog/{id}/download
///
/// Count one download and return the new total.
pub async fn record_download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DownloadRecorded>, ApiError> {
    let download_count = state.catalog().record_download(&id)?;
    CATALOG_DOWNLOADS_TOTAL.inc();
    Ok(Json(DownloadRecorded { download_count }))
}

/// GET /api/v1/catalog/meta/filters
pub async fn filter_options(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FilterOptions>, ApiError> {
    Ok(Json(state.catalog().filter_options()?))
}

/// GET /api/v1/catalog/meta/stats
pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<CatalogStats>, ApiError> {
    Ok(Json(state.catalog().stats()?))
}

// ============================================================================
// Admin handlers
// ============================================================================

/// GET /api/v1/admin/verify
pub async fn verify_admin(AuthUser(user): AuthUser) -> Json<VerifyResponse> {
    info!(user = %user, "Admin key verified");
    Json(VerifyResponse { ok: true })
}

/// GET /api/v1/admin/catalog
///
/// Same filters as the public listing, hidden entries included.
pub async fn admin_list_catalog(
    State(state): State<Arc<AppState>>,
    params: Result<Query<RawCatalogQuery>, QueryRejection>,
) -> Result<Json<CatalogPage>, ApiError> {
    let Query(params) = params?;
    let filter = params.resolve().including_inactive();
    Ok(Json(state.catalog().list(&filter)?))
}

/// POST /api/v1/catalog
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    payload: Result<Json<NewCatalogEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<CatalogEntry>), ApiError> {
    let Json(entry) = payload?;
    let created = state.catalog().create(entry)?;

    ADMIN_MUTATIONS_TOTAL.with_label_values(&["create"]).inc();
    info!(user = %user, id = %created.id, title = %created.title, "Created catalog entry");

    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/catalog/{id}
pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<NewCatalogEntry>, JsonRejection>,
) -> Result<Json<CatalogEntry>, ApiError> {
    let Json(entry) = payload?;
    let updated = state.catalog().update(&id, entry)?;

    ADMIN_MUTATIONS_TOTAL.with_label_values(&["update"]).inc();
    info!(user = %user, id = %id, "Updated catalog entry");

    Ok(Json(updated))
}

/// DELETE /api/v1/catalog/{id}
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.catalog().delete(&id)?;

    ADMIN_MUTATIONS_TOTAL.with_label_values(&["delete"]).inc();
    info!(user = %user, id = %id, "Deleted catalog entry");

    Ok(Json(MessageResponse {
        message: "Entry deleted".to_string(),
    }))
}

/// PATCH /api/v1/catalog/{id}/toggle-active
pub async fn toggle_active(
    state: State<Arc<AppState>>,
    user: AuthUser,
    id: Path<String>,
) -> Result<Json<CatalogEntry>, ApiError> {
    toggle(state, user, id, EntryFlag::Active)
}

/// PATCH /api/v1/catalog/{id}/toggle-trending
pub async fn toggle_trending(
    state: State<Arc<AppState>>,
    user: AuthUser,
    id: Path<String>,
) -> Result<Json<CatalogEntry>, ApiError> {
    toggle(state, user, id, EntryFlag::Trending)
}

/// PATCH /api/v1/catalog/{id}/toggle-featured
pub async fn toggle_featured(
    state: State<Arc<AppState>>,
    user: AuthUser,
    id: Path<String>,
) -> Result<Json<CatalogEntry>, ApiError> {
    toggle(state, user, id, EntryFlag::Featured)
}

fn toggle(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    flag: EntryFlag,
) -> Result<Json<CatalogEntry>, ApiError> {
    let entry = state.catalog().toggle(&id, flag)?;

    let action = match flag {
        EntryFlag::Active => "toggle_active",
        EntryFlag::Trending => "toggle_trending",
        EntryFlag::Featured => "toggle_featured",
    };
    ADMIN_MUTATIONS_TOTAL.with_label_values(&[action]).inc();
    info!(
        user = %user,
        id = %id,
        active = entry.is_active,
        trending = entry.is_trending,
        featured = entry.is_featured,
        "Toggled {:?}",
        flag
    );

    Ok(Json(entry))
}
