//! Configuration management for jobcrawl using the prefer crate.
//!
//! [`Settings`] are the resolved runtime values. A [`Config`] file (TOML or
//! JSON) is optional; every field in it is applied over the defaults, and a
//! few environment variables take precedence over both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::scrapers::{BrowserEngineConfig, RenderOptions, SelectorConfig};

/// Default database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "jobcrawl.db";

/// IT / Software listing pages crawled when nothing else is configured.
pub const DEFAULT_LISTING_URLS: &[&str] = &[
    "https://www.jobhunder.com/search/label/IT%20%2F%20Software",
    "https://www.jobhunder.com/search?updated-max=2025-04-08T07:33:00%2B05:30&max-results=8#PageNo=2",
    "https://www.jobhunder.com/search?updated-max=2025-04-04T07%3A35%3A00%2B05%3A30&max-results=6#PageNo=3",
    "https://www.jobhunder.com/search?updated-max=2025-04-03T07%3A31%3A00%2B05%3A30&max-results=6#PageNo=4",
    "https://www.jobhunder.com/search?updated-max=2025-04-01T07%3A17%3A00%2B05%3A30&max-results=6#PageNo=5",
    "https://www.jobhunder.com/search?updated-max=2025-03-30T14%3A24%3A00%2B05%3A30&max-results=6#PageNo=6",
];

/// Timing and retry budget for a crawl run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlPolicy {
    /// Attempts per detail page.
    pub max_retries: u32,
    pub navigation_timeout_secs: u64,
    /// Wait after a listing page loads for scripts to fill it in.
    pub listing_settle_ms: u64,
    pub detail_settle_ms: u64,
    /// Pause after every detail attempt.
    pub retry_delay_ms: u64,
    /// Pause between items on a listing page.
    pub item_delay_ms: u64,
}

impl Default for CrawlPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            navigation_timeout_secs: 60,
            listing_settle_ms: 2000,
            detail_settle_ms: 1000,
            retry_delay_ms: 500,
            item_delay_ms: 500,
        }
    }
}

impl CrawlPolicy {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn listing_render_options(&self) -> RenderOptions {
        RenderOptions {
            timeout: self.navigation_timeout(),
            settle: Duration::from_millis(self.listing_settle_ms),
        }
    }

    pub fn detail_render_options(&self) -> RenderOptions {
        RenderOptions {
            timeout: self.navigation_timeout(),
            settle: Duration::from_millis(self.detail_settle_ms),
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn item_delay(&self) -> Duration {
        Duration::from_millis(self.item_delay_ms)
    }
}

/// When the server runs the crawl on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub enabled: bool,
    /// Six-field cron expression (seconds first), local time.
    pub cron: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cron: "0 0 0 * * *".to_string(),
        }
    }
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename.
    pub database_filename: String,
    /// Database URL (overrides data_dir/database_filename if set).
    pub database_url: Option<String>,
    /// Listing pages, crawled in this order.
    pub listing_urls: Vec<String>,
    pub crawl: CrawlPolicy,
    pub browser: BrowserEngineConfig,
    pub selectors: SelectorConfig,
    pub schedule: ScheduleConfig,
}

impl Default for Settings {
    fn default() -> Self {
        // Data dir -> Home dir -> Current dir
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jobcrawl");

        Self {
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            database_url: None,
            listing_urls: DEFAULT_LISTING_URLS.iter().map(|s| s.to_string()).collect(),
            crawl: CrawlPolicy::default(),
            browser: BrowserEngineConfig::default(),
            selectors: SelectorConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Get the database URL, constructing from path if not explicitly set.
    pub fn database_url(&self) -> String {
        match self.database_url {
            Some(ref url) => url.clone(),
            None => format!("sqlite:{}", self.database_path().display()),
        }
    }

    /// Get the full path to the database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    /// Check if the database appears to be initialized.
    pub fn database_exists(&self) -> bool {
        self.database_url.is_some() || self.database_path().exists()
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}

/// Configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data directory, relative to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Database filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl: Option<CrawlPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<BrowserEngineConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectors: Option<SelectorConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleConfig>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Discover a jobcrawl config file in the standard locations.
    pub async fn load() -> Self {
        // prefer finds the file, serde parses it
        let path = match prefer::load("jobcrawl").await {
            Ok(pref_config) => pref_config.source_path().map(|p| p.to_path_buf()),
            Err(_) => None,
        };

        match path {
            Some(path) => Self::load_from_path(&path).await.unwrap_or_else(|e| {
                tracing::warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file path (TOML or JSON by extension).
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Directory relative paths in this config resolve against.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file or start with `~`.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
        }
        if let Some(ref database) = self.database {
            settings.database_filename = database.clone();
        }
        if let Some(ref urls) = self.listing_urls {
            settings.listing_urls = urls.clone();
        }
        if let Some(ref crawl) = self.crawl {
            settings.crawl = crawl.clone();
        }
        if let Some(ref browser) = self.browser {
            settings.browser = browser.clone();
        }
        if let Some(ref selectors) = self.selectors {
            settings.selectors = selectors.clone();
        }
        if let Some(ref schedule) = self.schedule {
            settings.schedule = schedule.clone();
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Data directory (--target flag).
    pub data: Option<PathBuf>,
}

/// Load settings: defaults, then the config file, then environment, then flags.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await.unwrap_or_else(|e| {
            tracing::warn!("Ignoring config {}: {}", path.display(), e);
            Config::default()
        }),
        None => Config::load().await,
    };

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let base_dir = config.base_dir().unwrap_or_else(|| cwd.clone());

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    // --target takes precedence over everything else
    if let Some(data) = options.data {
        settings.data_dir = if data.is_absolute() { data } else { cwd.join(data) };
    }

    (settings, config)
}

/// Apply environment overrides, reading variables through `var`.
pub fn apply_env_overrides<F>(settings: &mut Settings, var: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| var(key).filter(|s| !s.trim().is_empty());

    if let Some(dir) = var("JOBCRAWL_DATA_DIR") {
        settings.data_dir = PathBuf::from(dir);
    }
    if let Some(url) = var("DATABASE_URL") {
        tracing::debug!("Using DATABASE_URL from environment: {}", url);
        settings.database_url = Some(url);
    }
    if let Some(urls) = var("JOBCRAWL_LISTING_URLS") {
        settings.listing_urls = urls
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(remote) = var("BROWSER_URL") {
        tracing::debug!("Using remote browser from environment: {}", remote);
        settings.browser.remote_url = Some(remote);
    }
}
