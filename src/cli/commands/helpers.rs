//! Shared helpers for CLI commands.

use anyhow::Context;

use jobcrawl::config::Settings;
use jobcrawl::repository::{DieselDbContext, DieselJobRepository};

/// Open the job store, creating the data directory and schema if needed.
pub async fn open_jobs(settings: &Settings) -> anyhow::Result<DieselJobRepository> {
    settings
        .ensure_directories()
        .with_context(|| format!("Failed to create {}", settings.data_dir.display()))?;

    let ctx = DieselDbContext::from_url(&settings.database_url());
    ctx.init_schema()
        .await
        .context("Failed to initialize database schema")?;
    Ok(ctx.jobs())
}

/// Shorten `text` to at most `max` characters for table output.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
