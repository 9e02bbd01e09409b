//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM with compile-time query checking
//! over SQLite.

pub mod diesel_context;
pub mod diesel_job;
pub mod diesel_models;
pub mod diesel_pool;
pub mod store;
pub mod util;

pub use diesel_context::DieselDbContext;
pub use diesel_job::DieselJobRepository;
pub use diesel_pool::{AsyncSqlitePool, DieselError};
pub use store::{JobStore, PersistenceError, PersistenceResult};
