//! Feed streaming: the reconnecting client and the batch consumer.
//!
//! The client task owns the socket and pushes raw text frames into a
//! bounded queue; the batcher task drains that queue in batches. The queue
//! is the backpressure point between the two.

pub mod backoff;
pub mod batcher;
pub mod client;
pub mod state;

pub use backoff::Backoff;
pub use batcher::{BatchSettings, FrameBatcher};
pub use client::{ClientSettings, StreamClient};
pub use state::{ConnectionState, StreamCounters, StreamCountersSnapshot};
