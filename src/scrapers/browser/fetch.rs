//! Page render steps for the browser session.

use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::Page;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::ChromiumSession;
use crate::scrapers::error::NavigationError;
use crate::scrapers::render::{RenderOptions, RenderedPage};

/// Resolves once the DOM is interactive.
const WAIT_FOR_READY_SCRIPT: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
            setTimeout(() => resolve('timeout'), 10000);
        }
    })
"#;

/// Time left before `deadline`, zero once it has passed.
fn remaining(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}

/// Wait for DOMContentLoaded, giving up at `deadline`.
async fn wait_for_dom_content(page: &Page, deadline: Instant) {
    let budget = remaining(deadline);
    if budget.is_zero() {
        warn!("No time left to wait for page ready state");
        return;
    }
    match tokio::time::timeout(budget, page.evaluate(WAIT_FOR_READY_SCRIPT.to_string())).await {
        Ok(Ok(result)) => {
            let state: String = result
                .into_value()
                .unwrap_or_else(|_| "unknown".to_string());
            debug!("Page ready state: {}", state);
        }
        Ok(Err(e)) => debug!("Could not check ready state: {}", e),
        Err(_) => warn!("Timeout waiting for page ready state"),
    }
}

/// An open tab that is closed when dropped, unless closed explicitly first.
pub(super) struct TabGuard {
    page: Page,
    open: bool,
}

impl TabGuard {
    pub(super) fn new(page: Page) -> Self {
        Self { page, open: true }
    }

    pub(super) fn page(&self) -> &Page {
        &self.page
    }

    pub(super) async fn close(mut self, url: &str) {
        self.open = false;
        if let Err(e) = self.page.clone().close().await {
            debug!("Failed to close tab for {}: {}", url, e);
        }
    }
}

impl Drop for TabGuard {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        // Render future dropped mid-flight
        let page = self.page.clone();
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                let _ = page.close().await;
            });
        }
    }
}

impl ChromiumSession {
    /// Render `url` on an already-open page. The caller closes the page.
    pub(super) async fn render_inner(
        &self,
        page: &Page,
        url: &str,
        options: RenderOptions,
    ) -> Result<RenderedPage, NavigationError> {
        page.execute(SetUserAgentOverrideParams::new(self.user_agent.clone()))
            .await
            .map_err(|e| NavigationError::failed(url, e))?;

        // Navigation and the ready-state wait share one budget
        let deadline = Instant::now() + options.timeout;
        navigate(page, url, options.timeout).await?;
        wait_for_dom_content(page, deadline).await;

        if !options.settle.is_zero() {
            tokio::time::sleep(options.settle).await;
        }

        let final_url = page
            .url()
            .await
            .map_err(|e| NavigationError::failed(url, e))?
            .map(|u| u.to_string())
            .unwrap_or_else(|| url.to_string());
        let html = page
            .content()
            .await
            .map_err(|e| NavigationError::failed(url, e))?;

        Ok(RenderedPage {
            url: url.to_string(),
            final_url,
            html,
        })
    }
}

/// Navigate with a hard timeout.
async fn navigate(page: &Page, url: &str, timeout: Duration) -> Result<(), NavigationError> {
    info!("Navigating to {}", url);
    let nav_params = NavigateParams::builder()
        .url(url)
        .build()
        .map_err(|e| NavigationError::InvalidUrl {
            url: url.to_string(),
            cause: e.to_string(),
        })?;

    let response = tokio::time::timeout(timeout, page.execute(nav_params))
        .await
        .map_err(|_| NavigationError::Timeout {
            url: url.to_string(),
            timeout_secs: timeout.as_secs(),
        })?
        .map_err(|e| NavigationError::failed(url, e))?;

    // Network-level failures (DNS, refused, ...) come back as error text.
    if let Some(error_text) = response.result.error_text.as_deref() {
        return Err(NavigationError::failed(url, error_text));
    }

    Ok(())
}
