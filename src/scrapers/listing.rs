//! Listing page extraction.

use std::sync::Arc;

use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

use super::render::RenderedPage;
use super::selectors::{first_attr, first_text, Selectors};
use crate::models::{JobRecord, NO_DATE, NO_LINK, NO_TITLE};

/// Turns a rendered listing page into partial job records.
///
/// Every field is extracted independently; a miss yields that field's
/// sentinel and never affects the other fields or sibling items.
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    selectors: Arc<Selectors>,
}

impl ListingExtractor {
    pub fn new(selectors: Arc<Selectors>) -> Self {
        Self { selectors }
    }

    /// Extract one partial record per listing item, in document order.
    pub fn extract(&self, page: &RenderedPage) -> Vec<JobRecord> {
        let document = Html::parse_document(&page.html);
        let base = Url::parse(&page.final_url).ok();

        let records: Vec<JobRecord> = document
            .select(&self.selectors.item)
            .map(|item| self.extract_item(item, base.as_ref()))
            .collect();

        debug!("Extracted {} items from {}", records.len(), page.final_url);
        records
    }

    fn extract_item(&self, item: ElementRef<'_>, base: Option<&Url>) -> JobRecord {
        let s = &self.selectors;

        let title = first_text(item, &s.title).unwrap_or_else(|| NO_TITLE.to_string());
        let date = first_text(item, &s.date).unwrap_or_else(|| NO_DATE.to_string());
        let link = first_attr(item, &s.link, "href")
            .map(|href| resolve(base, &href))
            .unwrap_or_else(|| NO_LINK.to_string());
        let image = s
            .listing_images
            .first_match(item)
            .map(|src| resolve(base, &src));

        JobRecord::partial(title, date, link, image)
    }
}

/// Resolve `value` against `base`, keeping it verbatim when that fails.
pub(crate) fn resolve(base: Option<&Url>, value: &str) -> String {
    base.and_then(|b| b.join(value).ok())
        .map(String::from)
        .unwrap_or_else(|| value.to_string())
}
