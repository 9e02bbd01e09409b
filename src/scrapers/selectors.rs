//! CSS selectors for listing and detail pages.
//!
//! Markup on the source site varies between pages, so images are looked up
//! through an ordered chain of strategies where the first hit wins.

use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};

use super::error::ExtractionError;

/// Attributes that may carry an image URL, in priority order.
const IMAGE_ATTRS: &[&str] = &["src", "data-src", "data-lazy-src"];

/// Selector configuration (overridable from the config file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Repeated container for one job on a listing page.
    pub item: String,
    pub title: String,
    pub date: String,
    /// Anchor whose `href` is the detail page.
    pub link: String,
    /// Description node on the detail page.
    pub description: String,
    /// Image strategies, tried in order.
    pub image_chain: Vec<String>,
    /// Extra strategies appended to the chain on detail pages.
    pub detail_image_extra: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            item: ".post-filter-inside-wrap".to_string(),
            title: "h2.entry-title".to_string(),
            date: ".post-date.published".to_string(),
            link: "a.post-filter-link".to_string(),
            description: ".post-body.entry-content".to_string(),
            image_chain: vec![
                "img[src]".to_string(),
                ".post-thumb img".to_string(),
                "img.thumbnail".to_string(),
                "img.lazy".to_string(),
                "img[data-src]".to_string(),
            ],
            detail_image_extra: vec![".entry-content img".to_string()],
        }
    }
}

/// Parse a CSS selector, keeping the source text for error messages.
pub fn parse_selector(selector: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(selector).map_err(|e| ExtractionError::InvalidSelector {
        selector: selector.to_string(),
        cause: e.to_string(),
    })
}

/// One image lookup: the first element matching the selector, then the
/// first non-empty image attribute on it.
#[derive(Debug, Clone)]
pub struct ImageStrategy {
    source: String,
    selector: Selector,
}

impl ImageStrategy {
    pub fn new(selector: &str) -> Result<Self, ExtractionError> {
        Ok(Self {
            source: selector.to_string(),
            selector: parse_selector(selector)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn extract(&self, scope: ElementRef<'_>) -> Option<String> {
        let element = scope.select(&self.selector).next()?;
        IMAGE_ATTRS
            .iter()
            .filter_map(|attr| element.value().attr(attr))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(str::to_string)
    }
}

/// Ordered list of strategies; evaluates to the first `Some`.
#[derive(Debug, Clone)]
pub struct FallbackChain {
    strategies: Vec<ImageStrategy>,
}

impl FallbackChain {
    pub fn new<S: AsRef<str>>(selectors: &[S]) -> Result<Self, ExtractionError> {
        let strategies = selectors
            .iter()
            .map(|s| ImageStrategy::new(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { strategies })
    }

    /// A new chain with `extra` strategies tried after these.
    pub fn extended(&self, extra: &FallbackChain) -> Self {
        let mut strategies = self.strategies.clone();
        strategies.extend(extra.strategies.iter().cloned());
        Self { strategies }
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn first_match(&self, scope: ElementRef<'_>) -> Option<String> {
        self.strategies.iter().find_map(|s| s.extract(scope))
    }
}

/// Compiled form of [`SelectorConfig`].
#[derive(Debug, Clone)]
pub struct Selectors {
    pub item: Selector,
    pub title: Selector,
    pub date: Selector,
    pub link: Selector,
    pub description: Selector,
    pub listing_images: FallbackChain,
    pub detail_images: FallbackChain,
}

impl Selectors {
    pub fn compile(config: &SelectorConfig) -> Result<Self, ExtractionError> {
        let listing_images = FallbackChain::new(&config.image_chain)?;
        let detail_images = listing_images.extended(&FallbackChain::new(&config.detail_image_extra)?);

        Ok(Self {
            item: parse_selector(&config.item)?,
            title: parse_selector(&config.title)?,
            date: parse_selector(&config.date)?,
            link: parse_selector(&config.link)?,
            description: parse_selector(&config.description)?,
            listing_images,
            detail_images,
        })
    }
}

/// Trimmed text content of the first element matching `selector`.
pub fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let text: String = scope.select(selector).next()?.text().collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Non-empty attribute of the first element matching `selector`.
pub fn first_attr(scope: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    let value = scope.select(selector).next()?.value().attr(attr)?.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Collapse runs of whitespace to single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
