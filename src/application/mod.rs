//! Application services.
//!
//! These services drive the domain types and talk to the outside world
//! only through the ports.

pub mod cache;
pub mod ingest;
pub mod persistence;
pub mod shutdown;
pub mod stream;
