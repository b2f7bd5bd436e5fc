//! Write-behind persistence of vessel snapshots.

pub mod buffer;
pub mod writer;

pub use buffer::WriteBuffer;
pub use writer::{DurabilityStatus, FlushReport, FlushTrigger, PersistenceWriter, WriterSettings};
