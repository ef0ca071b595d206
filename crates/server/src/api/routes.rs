use std::sync::Arc;

use axum::{
    http::Uri,
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use super::middleware::{auth_middleware, metrics_middleware};
use super::{catalog, handlers, ApiError};
use crate::state::AppState;

/// Unknown paths under the API prefix are JSON 404s, never the SPA shell.
async fn api_not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let admin = middleware::from_fn_with_state(state.clone(), auth_middleware);
    let assets_dir = state.config().server.assets.clone();

    // API routes
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        // Catalog (public)
        .route("/catalog", get(catalog::list_catalog))
        .route("/catalog/search-suggestions", get(catalog::search_suggestions))
        .route("/catalog/meta/filters", get(catalog::filter_options))
        .route("/catalog/meta/stats", get(catalog::stats))
        .route("/catalog/{id}", get(catalog::get_entry))
        .route("/catalog/{id}/related", get(catalog::related))
        .route("/catalog/{id}/episodes", get(catalog::episodes))
        .route("/catalog/{id}/download", post(catalog::record_download))
        // Catalog (admin)
        .route(
            "/catalog",
            post(catalog::create_entry).route_layer(admin.clone()),
        )
        .route(
            "/catalog/{id}",
            put(catalog::update_entry).route_layer(admin.clone()),
        )
        .route(
            "/catalog/{id}",
            delete(catalog::delete_entry).route_layer(admin.clone()),
        )
        .route(
            "/catalog/{id}/toggle-active",
            patch(catalog::toggle_active).route_layer(admin.clone()),
        )
        .route(
            "/catalog/{id}/toggle-trending",
            patch(catalog::toggle_trending).route_layer(admin.clone()),
        )
        .route(
            "/catalog/{id}/toggle-featured",
            patch(catalog::toggle_featured).route_layer(admin.clone()),
        )
        // Admin console
        .route(
            "/admin/catalog",
            get(catalog::admin_list_catalog).route_layer(admin.clone()),
        )
        .route(
            "/admin/verify",
            get(catalog::verify_admin).route_layer(admin),
        )
        .fallback(api_not_found)
        .layer(middleware::from_fn(metrics_middleware))
        .with_state(state);

    let router = Router::new().nest("/api/v1", api_routes);

    // Serve the frontend bundle with SPA fallback
    let router = match assets_dir {
        Some(dir) => {
            let index_path = dir.join("index.html");
            router.fallback_service(ServeDir::new(&dir).fallback(ServeFile::new(index_path)))
        }
        None => router,
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
