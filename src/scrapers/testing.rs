//! In-memory render engine for tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::error::{NavigationError, RenderSessionError};
use super::render::{RenderEngine, RenderOptions, RenderSession, RenderedPage};
use crate::config::CrawlPolicy;

/// Policy with the production retry budget and no waiting.
pub fn fast_policy() -> CrawlPolicy {
    CrawlPolicy {
        listing_settle_ms: 0,
        detail_settle_ms: 0,
        retry_delay_ms: 0,
        item_delay_ms: 0,
        ..CrawlPolicy::default()
    }
}

#[derive(Debug, Default)]
struct FakeState {
    pages: HashMap<String, String>,
    timeouts: HashSet<String>,
    failures_left: HashMap<String, u32>,
    latency: Duration,
    renders: HashMap<String, u32>,
    opened: u32,
    closed: u32,
    session_closes: u32,
}

/// Serves canned HTML per URL and records every context it opens.
#[derive(Debug, Clone, Default)]
pub struct FakeSession {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.state().pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Every render of `url` times out.
    pub fn with_timeout(self, url: &str) -> Self {
        self.state().timeouts.insert(url.to_string());
        self
    }

    /// The first `count` renders of `url` fail.
    pub fn failing_first(self, url: &str, count: u32) -> Self {
        self.state().failures_left.insert(url.to_string(), count);
        self
    }

    /// Every render takes `latency` before it resolves.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.state().latency = latency;
        self
    }

    pub fn render_count(&self, url: &str) -> u32 {
        self.state().renders.get(url).copied().unwrap_or(0)
    }

    pub fn opened(&self) -> u32 {
        self.state().opened
    }

    pub fn closed(&self) -> u32 {
        self.state().closed
    }

    pub fn session_closes(&self) -> u32 {
        self.state().session_closes
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl RenderSession for FakeSession {
    async fn render(
        &self,
        url: &str,
        options: RenderOptions,
    ) -> Result<RenderedPage, NavigationError> {
        let latency = {
            let mut state = self.state();
            state.opened += 1;
            *state.renders.entry(url.to_string()).or_insert(0) += 1;
            state.latency
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state();

        let failing = match state.failures_left.get_mut(url) {
            Some(left) if *left > 0 => {
                *left -= 1;
                true
            }
            _ => false,
        };

        let result = if state.timeouts.contains(url) {
            Err(NavigationError::Timeout {
                url: url.to_string(),
                timeout_secs: options.timeout.as_secs(),
            })
        } else if failing {
            Err(NavigationError::failed(url, "net::ERR_CONNECTION_RESET"))
        } else {
            match state.pages.get(url) {
                Some(html) => Ok(RenderedPage {
                    url: url.to_string(),
                    final_url: url.to_string(),
                    html: html.clone(),
                }),
                None => Err(NavigationError::failed(url, "net::ERR_NAME_NOT_RESOLVED")),
            }
        };

        state.closed += 1;
        result
    }

    async fn close(&self) {
        self.state().session_closes += 1;
    }
}

/// Hands out [`FakeSession`]s that share state with the engine.
#[derive(Debug, Clone, Default)]
pub struct FakeEngine {
    session: FakeSession,
    fail_launch: bool,
    launches: Arc<Mutex<u32>>,
}

impl FakeEngine {
    pub fn new(session: FakeSession) -> Self {
        Self {
            session,
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            fail_launch: true,
            ..Default::default()
        }
    }

    pub fn session(&self) -> &FakeSession {
        &self.session
    }

    pub fn launches(&self) -> u32 {
        *self.launches.lock().unwrap()
    }
}

#[async_trait]
impl RenderEngine for FakeEngine {
    async fn launch(&self) -> Result<Box<dyn RenderSession>, RenderSessionError> {
        *self.launches.lock().unwrap() += 1;
        if self.fail_launch {
            return Err(RenderSessionError("no browser available".to_string()));
        }
        Ok(Box::new(self.session.clone()))
    }
}
