//! Data models for jobcrawl.

mod job;

pub use job::{
    JobRecord, StoredJob, DESCRIPTION_FAILED, DESCRIPTION_PENDING, NO_DATE, NO_DESCRIPTION,
    NO_LINK, NO_TITLE,
};
