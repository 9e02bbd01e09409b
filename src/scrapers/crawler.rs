//! Crawl orchestration: listing pages in order, items in order, one session.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::detail::DetailEnricher;
use super::error::CrawlError;
use super::listing::ListingExtractor;
use super::render::{RenderEngine, RenderSession};
use super::selectors::Selectors;
use crate::config::CrawlPolicy;
use crate::models::JobRecord;

/// Result of one crawl run.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    /// Every discovered record in discovery order, sentinel-marked ones included.
    pub records: Vec<JobRecord>,
    pub attempted: usize,
    pub enriched_ok: usize,
    pub enriched_failed: usize,
    /// Listing pages that rendered and were extracted.
    pub listing_pages: usize,
    pub listing_pages_failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            records: Vec::new(),
            attempted: 0,
            enriched_ok: 0,
            enriched_failed: 0,
            listing_pages: 0,
            listing_pages_failed: 0,
            started_at: now,
            finished_at: now,
        }
    }

    fn push(&mut self, record: JobRecord) {
        self.attempted += 1;
        if record.enrichment_failed() {
            self.enriched_failed += 1;
        } else {
            self.enriched_ok += 1;
        }
        self.records.push(record);
    }
}

/// Drives a sequential crawl over a fixed list of listing URLs.
pub struct Crawler {
    engine: Arc<dyn RenderEngine>,
    listing: ListingExtractor,
    detail: DetailEnricher,
    policy: CrawlPolicy,
}

impl Crawler {
    pub fn new(engine: Arc<dyn RenderEngine>, selectors: Arc<Selectors>, policy: CrawlPolicy) -> Self {
        Self {
            engine,
            listing: ListingExtractor::new(selectors.clone()),
            detail: DetailEnricher::new(selectors, policy.clone()),
            policy,
        }
    }

    /// Crawl `listing_urls` in order.
    ///
    /// Only a failure to start the render session is an error; page and item
    /// failures are logged and reflected in the report counters.
    pub async fn run_crawl(&self, listing_urls: &[String]) -> Result<CrawlReport, CrawlError> {
        let mut report = CrawlReport::new();

        let session = self.engine.launch().await?;
        info!("Crawling {} listing pages", listing_urls.len());

        for url in listing_urls {
            self.crawl_listing(session.as_ref(), url, &mut report).await;
        }

        session.close().await;
        report.finished_at = Utc::now();

        info!(
            "Crawl finished: {} attempted, {} enriched, {} failed, {}/{} listing pages",
            report.attempted,
            report.enriched_ok,
            report.enriched_failed,
            report.listing_pages,
            report.listing_pages + report.listing_pages_failed
        );

        Ok(report)
    }

    async fn crawl_listing(&self, session: &dyn RenderSession, url: &str, report: &mut CrawlReport) {
        info!("Loading listing page {}", url);

        let page = match session
            .render(url, self.policy.listing_render_options())
            .await
        {
            Ok(page) => page,
            Err(e) => {
                warn!("Skipping listing page: {}", e);
                report.listing_pages_failed += 1;
                return;
            }
        };

        let partials = self.listing.extract(&page);
        report.listing_pages += 1;
        info!("Found {} jobs on {}", partials.len(), url);

        let item_delay = self.policy.item_delay();
        for partial in partials {
            let record = self.detail.enrich(session, partial).await;
            report.push(record);

            if !item_delay.is_zero() {
                tokio::time::sleep(item_delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DESCRIPTION_FAILED;
    use crate::scrapers::selectors::SelectorConfig;
    use crate::scrapers::testing::{fast_policy, FakeEngine, FakeSession};

    fn listing_html(items: &[(&str, &str)]) -> String {
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

    fn detail_html(text: &str) -> String {
        format!(r#"<html><body><div class="post-body entry-content">{text}</div></body></html>"#)
    }

    fn crawler(engine: &FakeEngine) -> Crawler {
        Crawler::new(
            Arc::new(engine.clone()),
            Arc::new(Selectors::compile(&SelectorConfig::default()).unwrap()),
            fast_policy(),
        )
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_crawl_preserves_discovery_order() {
        let session = FakeSession::new()
            .with_page(
                "https://jobs.example.com/p1",
                &listing_html(&[("A", "https://jobs.example.com/a"), ("B", "https://jobs.example.com/b")]),
            )
            .with_page(
                "https://jobs.example.com/p2",
                &listing_html(&[("C", "https://jobs.example.com/c"), ("D", "https://jobs.example.com/d")]),
            )
            .with_page("https://jobs.example.com/a", &detail_html("about a"))
            .with_page("https://jobs.example.com/b", &detail_html("about b"))
            .with_page("https://jobs.example.com/c", &detail_html("about c"))
            .with_page("https://jobs.example.com/d", &detail_html("about d"));
        let engine = FakeEngine::new(session);

        let report = crawler(&engine)
            .run_crawl(&urls(&["https://jobs.example.com/p1", "https://jobs.example.com/p2"]))
            .await
            .unwrap();

        let titles: Vec<&str> = report.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C", "D"]);
        assert_eq!(report.records[2].description, "about c");
        assert_eq!(report.attempted, 4);
        assert_eq!(report.enriched_ok, 4);
        assert_eq!(report.enriched_failed, 0);
        assert_eq!(report.listing_pages, 2);
        assert!(report.finished_at >= report.started_at);
    }

    #[tokio::test]
    async fn test_failed_listing_page_is_skipped() {
        let session = FakeSession::new()
            .with_page(
                "https://jobs.example.com/p2",
                &listing_html(&[("C", "https://jobs.example.com/c")]),
            )
            .with_page("https://jobs.example.com/c", &detail_html("about c"));
        let engine = FakeEngine::new(session);

        let report = crawler(&engine)
            .run_crawl(&urls(&["https://jobs.example.com/missing", "https://jobs.example.com/p2"]))
            .await
            .unwrap();

        assert_eq!(report.listing_pages_failed, 1);
        assert_eq!(report.listing_pages, 1);
        assert_eq!(report.records.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_detail_keeps_item() {
        let session = FakeSession::new()
            .with_page(
                "https://jobs.example.com/p1",
                &listing_html(&[("Slow", "https://jobs.example.com/slow")]),
            )
            .with_timeout("https://jobs.example.com/slow");
        let engine = FakeEngine::new(session);

        let report = crawler(&engine)
            .run_crawl(&urls(&["https://jobs.example.com/p1"]))
            .await
            .unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].description, DESCRIPTION_FAILED);
        assert_eq!(report.enriched_failed, 1);
        assert_eq!(engine.session().render_count("https://jobs.example.com/slow"), 3);
    }

    #[tokio::test]
    async fn test_every_context_and_the_session_are_closed() {
        let session = FakeSession::new()
            .with_page(
                "https://jobs.example.com/p1",
                &listing_html(&[("A", "https://jobs.example.com/a"), ("Slow", "https://jobs.example.com/slow")]),
            )
            .with_page("https://jobs.example.com/a", &detail_html("about a"))
            .with_timeout("https://jobs.example.com/slow");
        let engine = FakeEngine::new(session);

        crawler(&engine)
            .run_crawl(&urls(&["https://jobs.example.com/p1", "https://jobs.example.com/gone"]))
            .await
            .unwrap();

        let session = engine.session();
        // 2 listing renders + 1 detail + 3 failed detail attempts
        assert_eq!(session.opened(), 6);
        assert_eq!(session.opened(), session.closed());
        assert_eq!(session.session_closes(), 1);
        assert_eq!(engine.launches(), 1);
    }

    #[tokio::test]
    async fn test_launch_failure_aborts_run() {
        let engine = FakeEngine::unavailable();
        let result = crawler(&engine)
            .run_crawl(&urls(&["https://jobs.example.com/p1"]))
            .await;

        assert!(matches!(result, Err(CrawlError::RenderSession(_))));
        assert_eq!(engine.session().opened(), 0);
    }
}
