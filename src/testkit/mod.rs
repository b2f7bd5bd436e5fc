//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`feed`]: mock [`FeedConnection`](crate::port::outbound::feed::FeedConnection)
//!   implementations, `ScriptedConnection` and `ChannelConnection`.
//! - [`domain`]: builders for updates, records and raw feed frames.
//! - [`store`]: in-memory stores, including one that fails on demand.

pub mod domain;
pub mod feed;
pub mod store;
