//! Persistence seam used by the dedup gate.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::models::JobRecord;

/// Errors from the job store.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Minimal store contract the pipeline needs: look up known links and insert new records.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Return the subset of `links` that is already stored.
    async fn find_existing(&self, links: &[String]) -> PersistenceResult<HashSet<String>>;

    /// Insert records, returning how many rows were actually written.
    async fn insert_many(&self, records: &[JobRecord]) -> PersistenceResult<usize>;
}
