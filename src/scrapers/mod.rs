//! Job listing scraping: rendering, extraction, enrichment and the crawl loop.

pub mod browser;
pub mod crawler;
pub mod detail;
pub mod error;
pub mod listing;
pub mod render;
pub mod retry;
pub mod selectors;
#[cfg(test)]
pub(crate) mod testing;

pub use browser::{BrowserEngineConfig, ChromiumEngine};
pub use crawler::{CrawlReport, Crawler};
pub use detail::DetailEnricher;
pub use error::{CrawlError, DetailError, ExtractionError, NavigationError, RenderSessionError};
pub use listing::ListingExtractor;
pub use render::{RenderEngine, RenderOptions, RenderSession, RenderedPage};
pub use retry::with_retries;
pub use selectors::{FallbackChain, SelectorConfig, Selectors};
