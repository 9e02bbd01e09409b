//! HTTP API for triggering scrapes and reading stored jobs.
//!
//! Routes:
//! - `POST /api/jobs/scrape` runs the pipeline and stores new jobs
//! - `GET /api/jobs` lists stored jobs
//! - `DELETE /api/jobs/deleteall` wipes the store
//! - `GET /health`, `GET /api/status`

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use crate::config::Settings;
use crate::repository::{DieselDbContext, DieselJobRepository};
use crate::scrapers::RenderEngine;
use crate::services::{start_scheduler, ScrapeService};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<DieselJobRepository>,
    /// Owns the render engine and the run guard.
    pub scraper: Arc<ScrapeService>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Open the database (creating the schema if needed) and wire the pipeline.
    pub async fn new(settings: &Settings, engine: Arc<dyn RenderEngine>) -> anyhow::Result<Self> {
        settings
            .ensure_directories()
            .context("Failed to create data directory")?;
        let ctx = DieselDbContext::from_url(&settings.database_url());
        ctx.init_schema()
            .await
            .context("Failed to initialize database schema")?;

        let jobs = Arc::new(ctx.jobs());
        let scraper = ScrapeService::new(engine, jobs.clone(), settings)
            .context("Invalid selector configuration")?;

        Ok(Self {
            jobs,
            scraper: Arc::new(scraper),
            settings: Arc::new(settings.clone()),
        })
    }
}

/// Start the web server, plus the daily scheduler when `schedule` is set.
pub async fn serve(
    settings: &Settings,
    engine: Arc<dyn RenderEngine>,
    bind: &str,
    schedule: bool,
) -> anyhow::Result<()> {
    let state = AppState::new(settings, engine).await?;

    // Keep the scheduler alive for as long as the server runs
    let _scheduler = if schedule && settings.schedule.enabled {
        Some(start_scheduler(state.scraper.clone(), &settings.schedule).await?)
    } else {
        tracing::info!("Scheduled scraping disabled");
        None
    };

    let app = create_router(state);

    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", bind))?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tempfile::tempdir;
    use tower::ServiceExt;

    use crate::models::{JobRecord, DESCRIPTION_FAILED};
    use crate::repository::JobStore;
    use crate::scrapers::testing::{fast_policy, FakeEngine, FakeSession};

    fn listing(items: &[(&str, &str)]) -> String {
        let body: String = items
            .iter()
            .map(|(title, link)| {
                format!(
                    r#"<div class="post-filter-inside-wrap">
                        <a class="post-filter-link" href="{link}"><h2 class="entry-title">{title}</h2></a>
                        <span class="post-date published">April 8, 2025</span>
                    </div>"#
                )
            })
            .collect();
        format!("<html><body>{body}</body></html>")
    }

    fn detail(text: &str) -> String {
        format!(r#"<html><body><div class="post-body entry-content">{text}</div></body></html>"#)
    }

    async fn setup_test_app(
        engine: FakeEngine,
        listing_urls: &[&str],
    ) -> (axum::Router, AppState, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let mut settings = Settings::with_data_dir(dir.path().to_path_buf());
        settings.listing_urls = listing_urls.iter().map(|s| s.to_string()).collect();
        settings.crawl = fast_policy();

        let state = AppState::new(&settings, Arc::new(engine)).await.unwrap();
        (create_router(state.clone()), state, dir)
    }

    async fn send(app: &axum::Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _state, _dir) = setup_test_app(FakeEngine::default(), &[]).await;
        let (status, _) = send(&app, "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_empty() {
        let (app, _state, _dir) = setup_test_app(FakeEngine::default(), &[]).await;
        let (status, json) = send(&app, "GET", "/api/jobs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_scrape_saves_only_new_jobs() {
        let session = FakeSession::new()
            .with_page(
                "https://jobs.example.com/p1",
                &listing(&[("A", "https://jobs.example.com/a"), ("B", "https://jobs.example.com/b")]),
            )
            .with_page(
                "https://jobs.example.com/p2",
                &listing(&[("C", "https://jobs.example.com/c"), ("D", "https://jobs.example.com/d")]),
            )
            .with_page("https://jobs.example.com/a", &detail("about a"))
            .with_page("https://jobs.example.com/b", &detail("about b"))
            .with_page("https://jobs.example.com/c", &detail("about c"))
            .with_page("https://jobs.example.com/d", &detail("about d"));
        let (app, state, _dir) = setup_test_app(
            FakeEngine::new(session),
            &["https://jobs.example.com/p1", "https://jobs.example.com/p2"],
        )
        .await;

        // Item #3 is already stored
        state
            .jobs
            .insert_many(&[JobRecord::partial(
                "C".to_string(),
                "April 1, 2025".to_string(),
                "https://jobs.example.com/c".to_string(),
                None,
            )])
            .await
            .unwrap();

        let (status, json) = send(&app, "POST", "/api/jobs/scrape").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["message"], "Scraped and saved 3 jobs.");

        let (status, json) = send(&app, "POST", "/api/jobs/scrape").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "No new jobs were scraped.");

        let (_, json) = send(&app, "GET", "/api/jobs").await;
        let titles: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|j| j["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["C", "A", "B", "D"]);
    }

    #[tokio::test]
    async fn test_scrape_stores_failed_detail_with_sentinel() {
        let session = FakeSession::new()
            .with_page(
                "https://jobs.example.com/p1",
                &listing(&[("Slow Job", "https://jobs.example.com/slow")]),
            )
            .with_timeout("https://jobs.example.com/slow");
        let (app, state, _dir) =
            setup_test_app(FakeEngine::new(session), &["https://jobs.example.com/p1"]).await;

        let (status, json) = send(&app, "POST", "/api/jobs/scrape").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["message"], "Scraped and saved 1 jobs.");

        let stored = state.jobs.get_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].job.title, "Slow Job");
        assert_eq!(stored[0].job.link, "https://jobs.example.com/slow");
        assert_eq!(stored[0].job.description, DESCRIPTION_FAILED);
    }

    #[tokio::test]
    async fn test_scrape_survives_client_disconnect() {
        let session = FakeSession::new()
            .with_page(
                "https://jobs.example.com/p1",
                &listing(&[("Slow Job", "https://jobs.example.com/slow")]),
            )
            .with_page("https://jobs.example.com/slow", &detail("worth the wait"))
            .with_latency(std::time::Duration::from_millis(200));
        let (app, state, _dir) = setup_test_app(
            FakeEngine::new(session.clone()),
            &["https://jobs.example.com/p1"],
        )
        .await;

        // Client gives up while the listing page is still rendering
        let request = app.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/jobs/scrape")
                .body(Body::empty())
                .unwrap(),
        );
        let gave_up = tokio::time::timeout(std::time::Duration::from_millis(50), request).await;
        assert!(gave_up.is_err());

        tokio::time::sleep(std::time::Duration::from_millis(1000)).await;

        assert_eq!(session.opened(), 2);
        assert_eq!(session.closed(), 2);
        assert_eq!(session.session_closes(), 1);
        let stored = state.jobs.get_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].job.description, "worth the wait");
    }

    #[tokio::test]
    async fn test_list_with_trailing_slash() {
        let (app, _state, _dir) = setup_test_app(FakeEngine::default(), &[]).await;
        let (status, json) = send(&app, "GET", "/api/jobs/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(json.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scrape_failure_returns_500() {
        let (app, _state, _dir) =
            setup_test_app(FakeEngine::unavailable(), &["https://jobs.example.com/p1"]).await;

        let (status, json) = send(&app, "POST", "/api/jobs/scrape").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "Failed to scrape and save jobs");
        assert!(json["error"].as_str().unwrap().contains("no browser available"));
    }

    #[tokio::test]
    async fn test_delete_all() {
        let (app, state, _dir) = setup_test_app(FakeEngine::default(), &[]).await;
        state
            .jobs
            .insert_many(&[
                JobRecord::partial(
                    "A".to_string(),
                    "d".to_string(),
                    "https://jobs.example.com/a".to_string(),
                    None,
                ),
                JobRecord::partial(
                    "B".to_string(),
                    "d".to_string(),
                    "https://jobs.example.com/b".to_string(),
                    None,
                ),
            ])
            .await
            .unwrap();

        let (status, json) = send(&app, "DELETE", "/api/jobs/deleteall").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Successfully deleted 2 jobs.");
        assert_eq!(state.jobs.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_status() {
        let (app, _state, _dir) =
            setup_test_app(FakeEngine::default(), &["https://jobs.example.com/p1"]).await;
        let (status, json) = send(&app, "GET", "/api/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["jobs"], 0);
        assert_eq!(json["scraping"], false);
        assert_eq!(json["listing_pages"], 1);
    }
}
