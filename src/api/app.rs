//! Router setup for the HTTP API

use std::path::Path;
use std::sync::Arc;

use axum::{extract::Extension, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::routes::{health_handler, prices_handler, scrape_handler};
use crate::pipeline::Refresher;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub refresher: Arc<Refresher>,
}

impl AppState {
    pub fn new(refresher: Arc<Refresher>) -> Self {
        Self { refresher }
    }
}

/// Build the Axum application router
///
/// When `static_dir` is set, unmatched paths are served from that directory
/// (so `/` returns its `index.html`).
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut router = Router::new()
        .route("/api/prices", get(prices_handler))
        .route("/api/scrape", get(scrape_handler))
        .route("/api/health", get(health_handler));

    if let Some(dir) = static_dir {
        tracing::info!("Serving static files from {}", dir.display());
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(Extension(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
