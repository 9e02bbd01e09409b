//! Crawl error taxonomy.
//!
//! Navigation and extraction failures are contained per item and turned into
//! sentinel values. Render session and persistence failures abort the run.

use thiserror::Error;

use crate::repository::PersistenceError;

/// A page could not be rendered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Navigation timed out after {timeout_secs}s for {url}")]
    Timeout { url: String, timeout_secs: u64 },
    #[error("Navigation failed for {url}: {cause}")]
    Failed { url: String, cause: String },
    #[error("Invalid URL {url}: {cause}")]
    InvalidUrl { url: String, cause: String },
}

impl NavigationError {
    /// The URL that failed to render.
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url, .. } | Self::Failed { url, .. } | Self::InvalidUrl { url, .. } => {
                url
            }
        }
    }

    pub fn failed(url: &str, cause: impl std::fmt::Display) -> Self {
        Self::Failed {
            url: url.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// Rendered markup did not have the expected structure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Invalid selector {selector}: {cause}")]
    InvalidSelector { selector: String, cause: String },
    #[error("No content found at {url}")]
    EmptyDocument { url: String },
}

/// A detail page attempt failed, either while rendering or while reading it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DetailError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// The rendering engine could not be started.
#[derive(Debug, Error)]
#[error("Render session failed to start: {0}")]
pub struct RenderSessionError(pub String);

/// Pipeline-level failure surfaced to whoever triggered the run.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    RenderSession(#[from] RenderSessionError),
    #[error("Failed to persist scraped jobs: {0}")]
    Persistence(#[from] PersistenceError),
}
