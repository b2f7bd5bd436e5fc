//! SQLite persistence adapter.
//!
//! Stores vessel snapshots with Diesel, one upsert transaction per batch.

pub mod database;
pub mod store;

pub use database::connection::{create_pool, run_migrations, DbPool};
pub use store::SqliteVesselStore;
