//! Rendering seam between the crawler and the browser.
//!
//! A [`RenderEngine`] starts one top-level session per crawl run. Each
//! [`RenderSession::render`] call opens its own isolated context (a tab),
//! navigates, lets deferred content settle and always closes the context
//! before returning.

use std::time::Duration;

use async_trait::async_trait;

use super::error::{NavigationError, RenderSessionError};

/// Per-render timing budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Upper bound for navigation to reach DOMContentLoaded.
    pub timeout: Duration,
    /// Fixed wait after navigation for scripts to populate the DOM.
    pub settle: Duration,
}

/// DOM snapshot of a rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// URL that was requested.
    pub url: String,
    /// URL after redirects; used to resolve relative links.
    pub final_url: String,
    /// Serialized DOM.
    pub html: String,
}

/// Starts rendering sessions.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Launch (or connect to) the browser for one crawl run.
    async fn launch(&self) -> Result<Box<dyn RenderSession>, RenderSessionError>;
}

/// A running browser that renders pages in isolated contexts.
#[async_trait]
pub trait RenderSession: Send + Sync {
    /// Render `url` in a fresh context that is closed on every exit path.
    async fn render(
        &self,
        url: &str,
        options: RenderOptions,
    ) -> Result<RenderedPage, NavigationError>;

    /// Tear down the session.
    async fn close(&self);
}
