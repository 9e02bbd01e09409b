//! Headless Chrome render engine.
//!
//! Uses chromiumoxide (CDP) to render JavaScript-driven listing and detail
//! pages. Each render opens its own tab, which is closed on every exit path.

mod config;
#[cfg(feature = "browser")]
mod fetch;

#[cfg(feature = "browser")]
use fetch::TabGuard;

pub use config::{BrowserEngineConfig, DEFAULT_USER_AGENT};

#[cfg(feature = "browser")]
use std::time::Duration;

use async_trait::async_trait;
#[cfg(feature = "browser")]
use anyhow::Context;
#[cfg(feature = "browser")]
use tokio::sync::Mutex;
#[cfg(feature = "browser")]
use tokio::task::JoinHandle;
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

#[cfg(feature = "browser")]
use chromiumoxide::handler::Handler;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig};
#[cfg(feature = "browser")]
use futures::StreamExt;

#[cfg(feature = "browser")]
use super::error::NavigationError;
use super::error::RenderSessionError;
#[cfg(feature = "browser")]
use super::render::{RenderOptions, RenderedPage};
use super::render::{RenderEngine, RenderSession};

/// Starts Chrome (or connects to a remote one) once per crawl run.
#[derive(Debug, Clone)]
pub struct ChromiumEngine {
    config: BrowserEngineConfig,
}

impl ChromiumEngine {
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BrowserEngineConfig {
        &self.config
    }
}

/// A running browser.
#[cfg(feature = "browser")]
pub struct ChromiumSession {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
    user_agent: String,
    /// Remote browsers are left running on close.
    remote: bool,
}

#[cfg(feature = "browser")]
impl ChromiumEngine {
    /// Common Chrome executable names to look up in PATH.
    const CHROME_COMMANDS: &'static [&'static str] = &[
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ];

    /// Common Chrome install paths outside PATH.
    const CHROME_PATHS: &'static [&'static str] = &[
        "/snap/bin/chromium",
        "/opt/google/chrome/google-chrome",
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
    ];

    /// Find a Chrome executable.
    fn find_chrome() -> anyhow::Result<std::path::PathBuf> {
        for cmd in Self::CHROME_COMMANDS {
            if let Ok(path) = which::which(cmd) {
                info!("Found Chrome in PATH: {}", path.display());
                return Ok(path);
            }
        }

        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        Err(anyhow::anyhow!(
            "Chrome/Chromium not found. Install it, or set BROWSER_URL to a remote DevTools endpoint"
        ))
    }

    async fn launch_local(&self) -> anyhow::Result<(Browser, Handler)> {
        info!("Launching browser (headless={})", self.config.headless);

        let chrome_path = Self::find_chrome()?;
        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .request_timeout(Duration::from_secs(self.config.timeout));

        // with_head means NOT headless
        if !self.config.headless {
            builder = builder.with_head();
        }

        if let Some(ref proxy) = self.config.proxy {
            builder = builder.arg(format!("--proxy-server={}", proxy));
        }

        builder = builder
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--no-sandbox") // containers
            .arg("--disable-gpu");

        for arg in &self.config.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        Browser::launch(config)
            .await
            .context("Failed to launch browser")
    }

    async fn connect_remote(&self, url: &str) -> anyhow::Result<(Browser, Handler)> {
        info!(
            "Connecting to remote browser at {} (timeout: {}s)",
            url, self.config.timeout
        );

        // The WebSocket URL comes from the /json/version endpoint
        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let resp: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .send()
            .await
            .context("Failed to connect to remote browser")?
            .json()
            .await
            .context("Failed to parse browser version info")?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("No webSocketDebuggerUrl in response"))?;

        debug!("Connecting to WebSocket: {}", ws_url);

        let handler_config = chromiumoxide::handler::HandlerConfig {
            request_timeout: Duration::from_secs(self.config.timeout),
            ..Default::default()
        };

        Browser::connect_with_config(ws_url, handler_config)
            .await
            .context("Failed to connect to remote browser")
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl RenderEngine for ChromiumEngine {
    async fn launch(&self) -> Result<Box<dyn RenderSession>, RenderSessionError> {
        let remote = self.config.remote_url.is_some();
        let started = match self.config.remote_url.as_deref() {
            Some(url) => self.connect_remote(url).await,
            None => self.launch_local().await,
        };
        let (browser, mut handler) = started.map_err(|e| RenderSessionError(format!("{:#}", e)))?;

        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(Box::new(ChromiumSession {
            browser: Mutex::new(browser),
            handler,
            user_agent: self.config.user_agent.clone(),
            remote,
        }))
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl RenderSession for ChromiumSession {
    async fn render(
        &self,
        url: &str,
        options: RenderOptions,
    ) -> Result<RenderedPage, NavigationError> {
        let page = {
            let browser = self.browser.lock().await;
            browser
                .new_page("about:blank")
                .await
                .map_err(|e| NavigationError::failed(url, e))?
        };

        // The guard closes the tab on every path, cancellation included
        let tab = TabGuard::new(page);
        let result = self.render_inner(tab.page(), url, options).await;
        tab.close(url).await;
        result
    }

    async fn close(&self) {
        if !self.remote {
            let mut browser = self.browser.lock().await;
            if let Err(e) = browser.close().await {
                warn!("Failed to close browser: {}", e);
            }
            let _ = browser.wait().await;
        }
        self.handler.abort();
    }
}

/// Stops the CDP handler if the session is dropped without `close()`.
/// Dropping the `Browser` kills a locally launched Chrome.
#[cfg(feature = "browser")]
impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
#[async_trait]
impl RenderEngine for ChromiumEngine {
    async fn launch(&self) -> Result<Box<dyn RenderSession>, RenderSessionError> {
        Err(RenderSessionError(
            "Browser support not compiled. Rebuild with: cargo build --features browser".to_string(),
        ))
    }
}
