//! Initialize command.

use console::style;

use jobcrawl::config::Settings;

use super::helpers::open_jobs;

/// Initialize the data directory and database.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    let jobs = open_jobs(settings).await?;
    let count = jobs.count().await?;

    println!(
        "{} Initialized jobcrawl in {}",
        style("✓").green(),
        settings.data_dir.display()
    );
    println!("  {} jobs stored", count);
    println!("  {} listing pages configured", settings.listing_urls.len());

    Ok(())
}
