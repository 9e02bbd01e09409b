//! Detail page enrichment with bounded retries.

use std::sync::Arc;

use scraper::Html;
use tracing::{debug, warn};
use url::Url;

use super::error::{DetailError, ExtractionError};
use super::listing::resolve;
use super::render::{RenderSession, RenderedPage};
use super::retry::with_retries;
use super::selectors::{collapse_whitespace, Selectors};
use crate::config::CrawlPolicy;
use crate::models::{JobRecord, DESCRIPTION_FAILED, NO_DESCRIPTION};

/// What one successful detail render yielded.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DetailContent {
    description: String,
    image: Option<String>,
}

/// Fills in `description` (and `image` when still missing) from a job's
/// detail page.
///
/// Failures never escape: once the attempt budget is spent the description
/// is set to [`DESCRIPTION_FAILED`] and the rest of the record is untouched.
#[derive(Debug, Clone)]
pub struct DetailEnricher {
    selectors: Arc<Selectors>,
    policy: CrawlPolicy,
}

impl DetailEnricher {
    pub fn new(selectors: Arc<Selectors>, policy: CrawlPolicy) -> Self {
        Self { selectors, policy }
    }

    pub async fn enrich(&self, session: &dyn RenderSession, mut record: JobRecord) -> JobRecord {
        if !record.has_navigable_link() {
            warn!("Skipping detail page for '{}': no navigable link", record.title);
            record.description = DESCRIPTION_FAILED.to_string();
            return record;
        }

        let max_attempts = self.policy.max_retries;
        let options = self.policy.detail_render_options();
        let image_missing = record.image.is_none();
        let link = record.link.as_str();

        let result = with_retries(link, max_attempts, self.policy.retry_delay(), |attempt| {
            debug!(
                "Loading detail page {} (attempt {}, {} retries left)",
                link,
                attempt,
                max_attempts.saturating_sub(attempt)
            );
            async move {
                // Every attempt renders in a fresh context.
                let page = session.render(link, options).await?;
                self.read_detail(&page, image_missing)
            }
        })
        .await;

        match result {
            Ok(content) => {
                record.description = content.description;
                if image_missing {
                    record.image = content.image;
                }
            }
            Err(e) => {
                warn!("Giving up on detail page {}: {}", record.link, e);
                record.description = DESCRIPTION_FAILED.to_string();
            }
        }

        record
    }

    /// Parse a rendered detail page. Kept synchronous: `Html` is not `Send`.
    fn read_detail(
        &self,
        page: &RenderedPage,
        want_image: bool,
    ) -> Result<DetailContent, DetailError> {
        if page.html.trim().is_empty() {
            return Err(ExtractionError::EmptyDocument {
                url: page.url.clone(),
            }
            .into());
        }

        let document = Html::parse_document(&page.html);
        let root = document.root_element();

        let description = root
            .select(&self.selectors.description)
            .next()
            .map(|node| collapse_whitespace(&node.text().collect::<String>()))
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());

        let image = if want_image {
            let base = Url::parse(&page.final_url).ok();
            self.selectors
                .detail_images
                .first_match(root)
                .map(|src| resolve(base.as_ref(), &src))
        } else {
            None
        };

        Ok(DetailContent { description, image })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NO_DATE, NO_LINK, NO_TITLE};
    use crate::scrapers::selectors::SelectorConfig;
    use crate::scrapers::testing::{fast_policy, FakeSession};

    fn enricher() -> DetailEnricher {
        DetailEnricher::new(
            Arc::new(Selectors::compile(&SelectorConfig::default()).unwrap()),
            fast_policy(),
        )
    }

    fn record(link: &str, image: Option<&str>) -> JobRecord {
        JobRecord::partial(
            "Rust Engineer".to_string(),
            "April 8, 2025".to_string(),
            link.to_string(),
            image.map(str::to_string),
        )
    }

    const DETAIL: &str = r#"<html><body>
        <div class="post-body entry-content">
            We are   hiring.
            <p>Remote   friendly.</p>
            <img data-src="/img/detail.png">
        </div>
    </body></html>"#;

    #[tokio::test]
    async fn test_enrich_sets_description_and_image() {
        let session = FakeSession::new().with_page("https://jobs.example.com/a", DETAIL);
        let enriched = enricher()
            .enrich(&session, record("https://jobs.example.com/a", None))
            .await;

        assert_eq!(enriched.description, "We are hiring. Remote friendly.");
        assert_eq!(
            enriched.image.as_deref(),
            Some("https://jobs.example.com/img/detail.png")
        );
        assert_eq!(session.render_count("https://jobs.example.com/a"), 1);
    }

    #[tokio::test]
    async fn test_enrich_keeps_listing_image() {
        let session = FakeSession::new().with_page("https://jobs.example.com/a", DETAIL);
        let enriched = enricher()
            .enrich(
                &session,
                record("https://jobs.example.com/a", Some("https://cdn.example.com/x.png")),
            )
            .await;

        assert_eq!(enriched.image.as_deref(), Some("https://cdn.example.com/x.png"));
    }

    #[tokio::test]
    async fn test_missing_description_node() {
        let session = FakeSession::new()
            .with_page("https://jobs.example.com/a", "<html><body><p>x</p></body></html>");
        let enriched = enricher()
            .enrich(&session, record("https://jobs.example.com/a", None))
            .await;

        assert_eq!(enriched.description, NO_DESCRIPTION);
        assert_eq!(enriched.image, None);
    }

    #[tokio::test]
    async fn test_always_failing_link_is_tried_exactly_max_retries() {
        let session = FakeSession::new().with_timeout("https://jobs.example.com/slow");
        let original = record("https://jobs.example.com/slow", None);
        let enriched = enricher().enrich(&session, original.clone()).await;

        assert_eq!(session.render_count("https://jobs.example.com/slow"), 3);
        assert_eq!(enriched.description, DESCRIPTION_FAILED);
        assert_eq!(enriched.title, original.title);
        assert_eq!(enriched.date, original.date);
        assert_eq!(enriched.link, original.link);
        assert_eq!(enriched.image, original.image);
        // Every context opened by an attempt was closed.
        assert_eq!(session.opened(), session.closed());
    }

    #[tokio::test]
    async fn test_recovers_on_later_attempt() {
        let session = FakeSession::new()
            .with_page("https://jobs.example.com/flaky", DETAIL)
            .failing_first("https://jobs.example.com/flaky", 2);
        let enriched = enricher()
            .enrich(&session, record("https://jobs.example.com/flaky", None))
            .await;

        assert_eq!(session.render_count("https://jobs.example.com/flaky"), 3);
        assert_eq!(enriched.description, "We are hiring. Remote friendly.");
    }

    #[tokio::test]
    async fn test_empty_document_is_retried() {
        let session = FakeSession::new().with_page("https://jobs.example.com/blank", "   ");
        let enriched = enricher()
            .enrich(&session, record("https://jobs.example.com/blank", None))
            .await;

        assert_eq!(session.render_count("https://jobs.example.com/blank"), 3);
        assert_eq!(enriched.description, DESCRIPTION_FAILED);
    }

    #[tokio::test]
    async fn test_link_sentinel_is_not_rendered() {
        let session = FakeSession::new();
        let partial = JobRecord::partial(
            NO_TITLE.to_string(),
            NO_DATE.to_string(),
            NO_LINK.to_string(),
            None,
        );
        let enriched = enricher().enrich(&session, partial).await;

        assert_eq!(enriched.description, DESCRIPTION_FAILED);
        assert_eq!(session.opened(), 0);
    }
}
