//! One-shot scrape command.

use std::sync::Arc;

use anyhow::Context;
use console::style;

use jobcrawl::config::Settings;
use jobcrawl::scrapers::ChromiumEngine;
use jobcrawl::services::ScrapeService;

use super::helpers::open_jobs;

/// Run the pipeline once and store new jobs.
pub async fn cmd_scrape(settings: &Settings) -> anyhow::Result<()> {
    let jobs = Arc::new(open_jobs(settings).await?);
    let engine = Arc::new(ChromiumEngine::new(settings.browser.clone()));
    let service = ScrapeService::new(engine, jobs, settings)
        .context("Invalid selector configuration")?;

    println!(
        "{} Scraping {} listing pages...",
        style("→").cyan(),
        service.listing_urls().len()
    );

    let outcome = match service.scrape_and_save().await {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("  {} Scrape failed: {}", style("✗").red(), e);
            return Err(e.into());
        }
    };
    let report = &outcome.report;

    println!(
        "  {} {} listing pages loaded",
        style("✓").green(),
        report.listing_pages
    );
    if report.listing_pages_failed > 0 {
        println!(
            "  {} {} listing pages failed",
            style("!").yellow(),
            report.listing_pages_failed
        );
    }
    println!(
        "  {} {} jobs found, {} with descriptions",
        style("✓").green(),
        report.attempted,
        report.enriched_ok
    );
    if report.enriched_failed > 0 {
        println!(
            "  {} {} detail pages failed after retries",
            style("!").yellow(),
            report.enriched_failed
        );
    }

    if outcome.inserted > 0 {
        println!(
            "{} Scraped and saved {} jobs.",
            style("✓").green(),
            outcome.inserted
        );
    } else {
        println!("{} No new jobs were scraped.", style("·").dim());
    }

    Ok(())
}
