//! Ingest path: decoded updates into caches and the write buffer.

pub mod coordinator;
pub mod counters;

pub use coordinator::{BatchReport, Coordinator};
pub use counters::{IngestCounters, IngestCountersSnapshot};
