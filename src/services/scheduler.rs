//! Daily scrape trigger using tokio-cron-scheduler.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_cron_scheduler::{Job, JobScheduler};

use super::scrape::ScrapeService;
use crate::config::ScheduleConfig;

/// Register the scrape job on `schedule.cron` (local time) and start it.
///
/// Failed runs are logged and never stop the scheduler. A tick that fires
/// while another run is in progress is skipped.
pub async fn start_scheduler(
    service: Arc<ScrapeService>,
    schedule: &ScheduleConfig,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new()
        .await
        .context("Failed to create scheduler")?;

    let scrape_job = Job::new_async_tz(schedule.cron.as_str(), chrono::Local, move |_uuid, _lock| {
        let service = service.clone();
        Box::pin(async move {
            tracing::info!("Running scheduled scrape");
            match service.try_scrape_and_save().await {
                None => tracing::info!("Scrape already in progress, skipping scheduled run"),
                Some(Ok(outcome)) => tracing::info!(
                    "Scheduled scrape stored {} new jobs",
                    outcome.inserted
                ),
                Some(Err(e)) => tracing::error!("Scheduled scrape failed: {}", e),
            }
        })
    })
    .with_context(|| format!("Invalid cron expression: {}", schedule.cron))?;

    scheduler.add(scrape_job).await?;
    scheduler.start().await?;

    tracing::info!("Scheduled scrape registered ({})", schedule.cron);
    Ok(scheduler)
}
