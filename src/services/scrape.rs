//! Scrape-and-save service shared by the CLI, the HTTP API and the scheduler.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use super::dedup::DedupSink;
use crate::config::Settings;
use crate::repository::JobStore;
use crate::scrapers::{CrawlError, CrawlReport, Crawler, ExtractionError, RenderEngine, Selectors};

/// Result of one scrape-and-save run.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeOutcome {
    pub report: CrawlReport,
    /// Rows actually written.
    pub inserted: usize,
}

/// Runs the crawl and persists new jobs, one run at a time per process.
pub struct ScrapeService {
    crawler: Crawler,
    sink: DedupSink,
    listing_urls: Vec<String>,
    run_guard: Mutex<()>,
}

impl ScrapeService {
    /// Build the service; fails if a configured selector does not parse.
    pub fn new(
        engine: Arc<dyn RenderEngine>,
        store: Arc<dyn JobStore>,
        settings: &Settings,
    ) -> Result<Self, ExtractionError> {
        let selectors = Arc::new(Selectors::compile(&settings.selectors)?);
        Ok(Self {
            crawler: Crawler::new(engine, selectors, settings.crawl.clone()),
            sink: DedupSink::new(store),
            listing_urls: settings.listing_urls.clone(),
            run_guard: Mutex::new(()),
        })
    }

    pub fn listing_urls(&self) -> &[String] {
        &self.listing_urls
    }

    /// Whether a run is currently in progress.
    pub fn is_running(&self) -> bool {
        self.run_guard.try_lock().is_err()
    }

    /// Crawl and persist, waiting for any run already in progress.
    pub async fn scrape_and_save(&self) -> Result<ScrapeOutcome, CrawlError> {
        let _guard = self.run_guard.lock().await;
        self.run().await
    }

    /// Like [`scrape_and_save`](Self::scrape_and_save), but returns `None`
    /// immediately if another run holds the guard.
    pub async fn try_scrape_and_save(&self) -> Option<Result<ScrapeOutcome, CrawlError>> {
        let _guard = self.run_guard.try_lock().ok()?;
        Some(self.run().await)
    }

    async fn run(&self) -> Result<ScrapeOutcome, CrawlError> {
        let report = self.crawler.run_crawl(&self.listing_urls).await?;
        let inserted = self.sink.persist_new(&report.records).await?;

        info!(
            "Scrape complete: {} scraped, {} new, {} without description",
            report.records.len(),
            inserted,
            report.enriched_failed
        );

        Ok(ScrapeOutcome { report, inserted })
    }
}
