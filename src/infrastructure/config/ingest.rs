//! Ingest queue and batching settings.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IngestConfig {
    /// Frames buffered between the read task and the batch task.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Most frames decoded and applied per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Cap on distinct vessels tracked; unlimited when absent.
    #[serde(default)]
    pub max_tracked_vessels: Option<usize>,
    #[serde(default = "default_summary_interval_secs")]
    pub summary_interval_secs: u64,
}

fn default_queue_capacity() -> usize {
    10_000
}

fn default_batch_size() -> usize {
    50
}

fn default_summary_interval_secs() -> u64 {
    45
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            batch_size: default_batch_size(),
            max_tracked_vessels: None,
            summary_interval_secs: default_summary_interval_secs(),
        }
    }
}
