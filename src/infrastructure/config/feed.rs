//! Feed connection, reconnection and keepalive settings.

use std::time::Duration;

use serde::Deserialize;

/// Feed endpoint and subscription.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_url")]
    pub url: String,
    /// Overridden by `AISSTREAM_API_KEY` when that is set.
    #[serde(default)]
    pub api_key: String,
    /// `[[south, west], [north, east]]` per box. Defaults to the region table.
    #[serde(default)]
    pub bounding_boxes: Option<Vec<[[f64; 2]; 2]>>,
}

fn default_url() -> String {
    "wss://stream.aisstream.io/v0/stream".into()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            api_key: String::new(),
            bounding_boxes: None,
        }
    }
}

/// Reconnect backoff bounds and the per-attempt connect deadline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReconnectionConfig {
    /// First delay after a loss (milliseconds).
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    /// Backoff ceiling (milliseconds).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Deadline for one connect+subscribe attempt (seconds).
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_min_delay_ms() -> u64 {
    2000
}

fn default_max_delay_ms() -> u64 {
    60000
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for ReconnectionConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl ReconnectionConfig {
    #[must_use]
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    #[must_use]
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Ping/pong liveness.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeepaliveConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Must be shorter than `interval_secs`.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_interval_secs() -> u64 {
    20
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
