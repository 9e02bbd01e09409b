//! Diesel ORM models for database tables.

use chrono::Utc;
use diesel::prelude::*;

use super::util::{format_datetime, parse_datetime};
use crate::models::{JobRecord, StoredJob};
use crate::schema;

/// Job row from the database.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = schema::jobs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct JobRow {
    pub seq: i32,
    pub id: String,
    pub title: String,
    pub date: String,
    pub link: String,
    pub image: Option<String>,
    pub description: String,
    pub created_at: String,
}

/// New job for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::jobs)]
pub struct NewJob<'a> {
    pub id: String,
    pub title: &'a str,
    pub date: &'a str,
    pub link: &'a str,
    pub image: Option<&'a str>,
    pub description: &'a str,
    pub created_at: String,
}

impl<'a> NewJob<'a> {
    /// Build an insertable row for a scraped record, assigning id and timestamp.
    pub fn from_record(record: &'a JobRecord) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: &record.title,
            date: &record.date,
            link: &record.link,
            image: record.image.as_deref(),
            description: &record.description,
            created_at: format_datetime(&Utc::now()),
        }
    }
}

impl From<JobRow> for StoredJob {
    fn from(row: JobRow) -> Self {
        StoredJob {
            id: row.id,
            job: JobRecord {
                title: row.title,
                date: row.date,
                link: row.link,
                image: row.image,
                description: row.description,
            },
            created_at: parse_datetime(&row.created_at),
        }
    }
}
