//! Vesselwatch - live AIS vessel tracking with durable storage.
//!
//! A long-running pipeline subscribes to an AIS WebSocket feed, decodes
//! position and static-data reports, keeps an in-memory view of every
//! vessel and of which geographic regions each one is in, and writes
//! vessel records to SQLite in coalesced batches.
//!
//! # Architecture
//!
//! - [`domain`] - vessel records, updates, regions, ship types
//! - [`port`] - feed connection, frame decoder and vessel store traits
//! - [`adapter`] - aisstream.io feed, SQLite store, CLI
//! - [`application`] - caches, ingest coordination, batched persistence,
//!   the reconnecting stream client
//! - [`infrastructure`] - configuration and pipeline lifecycle
//!
//! # Example
//!
//! ```no_run
//! use vesselwatch::infrastructure::bootstrap;
//! use vesselwatch::infrastructure::config::Config;
//!
//! # async fn demo() -> vesselwatch::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let handle = bootstrap::start(&config).await?;
//! println!("{} vessels tracked", handle.vessels().len());
//! handle.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
