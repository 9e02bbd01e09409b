//! Service layer for jobcrawl.
//!
//! Domain logic separated from UI concerns, shared by the CLI, the web
//! server and the scheduler.

pub mod dedup;
pub mod scheduler;
pub mod scrape;

pub use dedup::DedupSink;
pub use scheduler::start_scheduler;
pub use scrape::{ScrapeOutcome, ScrapeService};
