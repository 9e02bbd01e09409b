//! jobcrawl - render, extract, enrich and persist job listings.
//!
//! The pipeline is [`scrapers::Crawler`] (listing pages in order, detail
//! pages with bounded retries) feeding [`services::DedupSink`], wrapped by
//! [`services::ScrapeService`] which the CLI, the HTTP API and the scheduler
//! all call.

pub mod config;
pub mod models;
pub mod repository;
pub mod schema;
pub mod scrapers;
pub mod server;
pub mod services;
