//! Diesel-based job repository for SQLite.
//!
//! Uses diesel-async's SyncConnectionWrapper to provide an async interface
//! while maintaining Diesel's compile-time query checking.

use std::collections::HashSet;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use super::diesel_models::{JobRow, NewJob};
use super::diesel_pool::{AsyncSqlitePool, DieselError};
use super::store::{JobStore, PersistenceResult};
use crate::models::{JobRecord, StoredJob};
use crate::schema::jobs;

/// Max bound parameters per lookup query.
const LOOKUP_CHUNK_SIZE: usize = 500;

/// Diesel-based job repository with compile-time query checking.
#[derive(Clone, Debug)]
pub struct DieselJobRepository {
    pool: AsyncSqlitePool,
}

impl DieselJobRepository {
    /// Create a new Diesel job repository with an existing pool.
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Get all stored jobs in insertion order.
    pub async fn get_all(&self) -> Result<Vec<StoredJob>, DieselError> {
        let mut conn = self.pool.get().await?;

        jobs::table
            .order(jobs::seq.asc())
            .select(JobRow::as_select())
            .load::<JobRow>(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(StoredJob::from).collect())
    }

    /// Get a stored job by its link.
    pub async fn get_by_link(&self, link: &str) -> Result<Option<StoredJob>, DieselError> {
        let mut conn = self.pool.get().await?;

        jobs::table
            .filter(jobs::link.eq(link))
            .select(JobRow::as_select())
            .first::<JobRow>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(StoredJob::from))
    }

    /// Count stored jobs.
    pub async fn count(&self) -> Result<u64, DieselError> {
        let mut conn = self.pool.get().await?;

        let count: i64 = jobs::table.count().get_result(&mut conn).await?;
        Ok(count as u64)
    }

    /// Delete every stored job, returning how many were removed.
    pub async fn delete_all(&self) -> Result<usize, DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::delete(jobs::table).execute(&mut conn).await
    }
}

#[async_trait]
impl JobStore for DieselJobRepository {
    async fn find_existing(&self, links: &[String]) -> PersistenceResult<HashSet<String>> {
        let mut existing = HashSet::new();
        if links.is_empty() {
            return Ok(existing);
        }

        let mut conn = self.pool.get().await?;
        for chunk in links.chunks(LOOKUP_CHUNK_SIZE) {
            let found: Vec<String> = jobs::table
                .filter(jobs::link.eq_any(chunk))
                .select(jobs::link)
                .load(&mut conn)
                .await?;
            existing.extend(found);
        }

        debug!("{} of {} links already stored", existing.len(), links.len());
        Ok(existing)
    }

    async fn insert_many(&self, records: &[JobRecord]) -> PersistenceResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let rows: Vec<NewJob<'_>> = records.iter().map(NewJob::from_record).collect();
        let mut conn = self.pool.get().await?;

        // All-or-nothing; OR IGNORE skips links another run stored first.
        let inserted = conn
            .transaction::<usize, DieselError, _>(|conn| {
                async move {
                    let mut inserted = 0;
                    for row in &rows {
                        inserted += diesel::insert_or_ignore_into(jobs::table)
                            .values(row)
                            .execute(conn)
                            .await?;
                    }
                    Ok(inserted)
                }
                .scope_boxed()
            })
            .await?;

        Ok(inserted)
    }
}
