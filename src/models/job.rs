//! Job posting models.
//!
//! A [`JobRecord`] is created partially from a listing page, filled in from
//! its detail page and finally persisted as a [`StoredJob`]. Fields that
//! could not be extracted hold a sentinel string instead of being empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title used when a listing item has no usable title node.
pub const NO_TITLE: &str = "No title available";
/// Date used when a listing item has no usable date node.
pub const NO_DATE: &str = "No date available";
/// Link used when a listing item has no usable link.
pub const NO_LINK: &str = "No link available";
/// Description placeholder before the detail page has been visited.
pub const DESCRIPTION_PENDING: &str = "Not loaded yet";
/// Description used when the detail page rendered but had no description node.
pub const NO_DESCRIPTION: &str = "No description available";
/// Description used when every detail page attempt failed.
pub const DESCRIPTION_FAILED: &str = "Failed to load description after retries";

/// A scraped job posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: String,
    /// Date text as displayed by the site; never parsed.
    pub date: String,
    /// De-duplication key.
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub description: String,
}

impl JobRecord {
    /// Create a partial record as produced by the listing extractor.
    pub fn partial(title: String, date: String, link: String, image: Option<String>) -> Self {
        Self {
            title,
            date,
            link,
            image,
            description: DESCRIPTION_PENDING.to_string(),
        }
    }

    /// Whether the link points somewhere a browser can navigate to.
    pub fn has_navigable_link(&self) -> bool {
        self.link != NO_LINK
            && url::Url::parse(&self.link)
                .map(|u| matches!(u.scheme(), "http" | "https"))
                .unwrap_or(false)
    }

    /// Whether enrichment gave up on this record.
    pub fn enrichment_failed(&self) -> bool {
        self.description == DESCRIPTION_FAILED
    }
}

/// A job posting as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredJob {
    pub id: String,
    #[serde(flatten)]
    pub job: JobRecord,
    pub created_at: DateTime<Utc>,
}

impl StoredJob {
    /// Wrap a record with a fresh id and insertion timestamp.
    pub fn new(job: JobRecord) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            job,
            created_at: Utc::now(),
        }
    }
}
