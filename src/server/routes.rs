//! Router configuration for the web server.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Job routes, relative to their mount point.
fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_jobs))
        .route("/scrape", post(handlers::scrape_jobs))
        .route("/deleteall", delete(handlers::delete_all_jobs))
}

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/status", get(handlers::status))
        .route("/api/jobs/", get(handlers::list_jobs))
        .nest("/api/jobs", job_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
