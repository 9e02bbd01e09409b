//! Delete all stored jobs.

use console::style;

use jobcrawl::config::Settings;

use super::helpers::open_jobs;

pub async fn cmd_purge(settings: &Settings) -> anyhow::Result<()> {
    let deleted = open_jobs(settings).await?.delete_all().await?;
    println!(
        "{} Successfully deleted {} jobs.",
        style("✓").green(),
        deleted
    );
    Ok(())
}
