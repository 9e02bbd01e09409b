//! Service-level endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use super::super::AppState;

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Stored job count and whether a scrape is running.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    match state.jobs.count().await {
        Ok(count) => Json(serde_json::json!({
            "jobs": count,
            "scraping": state.scraper.is_running(),
            "listing_pages": state.scraper.listing_urls().len(),
        }))
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
