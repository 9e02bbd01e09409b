//! HTTP request handlers for the web server.

mod api;
mod jobs;

pub use api::{health, status};
pub use jobs::{delete_all_jobs, list_jobs, scrape_jobs};
