//! Dedup gate between a crawl report and the job store.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use crate::models::JobRecord;
use crate::repository::{JobStore, PersistenceResult};

/// Persists only records whose link the store has not seen.
#[derive(Clone)]
pub struct DedupSink {
    store: Arc<dyn JobStore>,
}

impl DedupSink {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Insert the unseen subset of `records`, returning the rows written.
    ///
    /// Existing links are looked up in one batch. Within `records` the first
    /// occurrence of a link wins. Nothing is inserted when nothing is new.
    pub async fn persist_new(&self, records: &[JobRecord]) -> PersistenceResult<usize> {
        let unique = first_per_link(records);
        let links: Vec<String> = unique.iter().map(|r| r.link.clone()).collect();

        let existing = self.store.find_existing(&links).await?;
        let fresh: Vec<JobRecord> = unique
            .into_iter()
            .filter(|r| !existing.contains(&r.link))
            .cloned()
            .collect();

        if fresh.is_empty() {
            info!(
                "No new jobs among {} scraped ({} already stored)",
                records.len(),
                existing.len()
            );
            return Ok(0);
        }

        let inserted = self.store.insert_many(&fresh).await?;
        info!(
            "Stored {} new jobs ({} scraped, {} already stored)",
            inserted,
            records.len(),
            existing.len()
        );
        Ok(inserted)
    }
}

/// Keep the first record for each link, preserving order.
fn first_per_link(records: &[JobRecord]) -> Vec<&JobRecord> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.link.as_str()))
        .collect()
}
