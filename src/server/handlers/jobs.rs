//! Job endpoints, mounted under `/api/jobs`.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use super::super::AppState;

fn failure(message: &str, error: impl std::fmt::Display) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": message, "error": error.to_string() })),
    )
        .into_response()
}

/// Run the crawl and store new jobs. Waits for a run already in progress.
///
/// The run is spawned so that a client disconnect does not cancel it.
pub async fn scrape_jobs(State(state): State<AppState>) -> impl IntoResponse {
    let scraper = state.scraper.clone();
    let run = tokio::spawn(async move { scraper.scrape_and_save().await });

    let result = match run.await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Scrape task failed: {}", e);
            return failure("Failed to scrape and save jobs", e);
        }
    };

    match result {
        Ok(outcome) if outcome.inserted > 0 => (
            StatusCode::CREATED,
            Json(json!({
                "message": format!("Scraped and saved {} jobs.", outcome.inserted)
            })),
        )
            .into_response(),
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "message": "No new jobs were scraped." })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Scrape request failed: {}", e);
            failure("Failed to scrape and save jobs", e)
        }
    }
}

/// All stored jobs in insertion order.
pub async fn list_jobs(State(state): State<AppState>) -> impl IntoResponse {
    match state.jobs.get_all().await {
        Ok(jobs) => Json(jobs).into_response(),
        Err(e) => failure("Failed to get posts", e),
    }
}

/// Delete every stored job.
pub async fn delete_all_jobs(State(state): State<AppState>) -> impl IntoResponse {
    match state.jobs.delete_all().await {
        Ok(deleted) => {
            tracing::info!("Deleted {} jobs", deleted);
            Json(json!({
                "message": format!("Successfully deleted {} jobs.", deleted)
            }))
            .into_response()
        }
        Err(e) => failure("Failed to delete jobs", e),
    }
}
