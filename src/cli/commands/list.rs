//! List stored jobs.

use console::style;

use jobcrawl::config::Settings;

use super::helpers::{open_jobs, truncate};

/// Print stored jobs as a table, or as JSON with `json`.
pub async fn cmd_list(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let jobs = open_jobs(settings).await?.get_all().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&jobs)?);
        return Ok(());
    }

    if jobs.is_empty() {
        println!("{} No jobs stored yet", style("!").yellow());
        return Ok(());
    }

    println!("{:<50} {:<20} {}", "Title", "Date", "Link");
    println!("{}", "-".repeat(110));
    for stored in &jobs {
        let title = truncate(&stored.job.title, 48);
        let line = format!("{:<50} {:<20} {}", title, truncate(&stored.job.date, 18), stored.job.link);
        if stored.job.enrichment_failed() {
            println!("{}", style(line).dim());
        } else {
            println!("{}", line);
        }
    }
    println!("\n{} jobs", jobs.len());

    Ok(())
}
