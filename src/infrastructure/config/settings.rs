//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all pipeline settings.
//! Configuration is loaded from a TOML file with an environment variable
//! override for the feed credential (`AISSTREAM_API_KEY`).
//!
//! # Example
//!
//! ```no_run
//! use vesselwatch::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use super::feed::{FeedConfig, KeepaliveConfig, ReconnectionConfig};
use super::ingest::IngestConfig;
use super::logging::LoggingConfig;
use super::persistence::PersistenceConfig;
use super::region::RegionConfig;
use crate::application::persistence::WriterSettings;
use crate::application::stream::{BatchSettings, ClientSettings};
use crate::domain::region::{default_regions, BoundingBox, Region};
use crate::error::{ConfigError, Result};
use crate::port::outbound::feed::Subscription;

/// Environment variable that overrides `feed.api_key`.
pub const API_KEY_ENV: &str = "AISSTREAM_API_KEY";

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`]. Every section is optional; omitted values take
/// their defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    /// Feed endpoint, credential and subscription boxes.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Reconnect backoff bounds.
    #[serde(default)]
    pub reconnection: ReconnectionConfig,

    /// Ping/pong liveness settings.
    #[serde(default)]
    pub keepalive: KeepaliveConfig,

    /// Queue, batching and admission settings.
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Durable storage settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Region table. The built-in table is used when empty.
    #[serde(default)]
    pub regions: Vec<RegionConfig>,
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Applies the `AISSTREAM_API_KEY` override, then validates.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config = Self::parse_unvalidated(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and apply the environment override without validating.
    ///
    /// For offline commands that only need part of the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed.
    pub fn parse_unvalidated(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.feed.api_key = key;
            }
        }

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load a configuration file without validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_unvalidated<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_unvalidated(&content)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns the first invalid or missing value found.
    pub fn validate(&self) -> Result<()> {
        if self.feed.url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "feed.url" }.into());
        }
        let url = Url::parse(&self.feed.url).map_err(|e| invalid("feed.url", e.to_string()))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(invalid("feed.url", "scheme must be ws or wss").into());
        }
        if self.feed.api_key.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "feed.api_key",
            }
            .into());
        }
        self.bounding_boxes()?;

        if self.reconnection.min_delay_ms == 0 {
            return Err(invalid("reconnection.min_delay_ms", "must be greater than 0").into());
        }
        if self.reconnection.max_delay_ms < self.reconnection.min_delay_ms {
            return Err(invalid("reconnection.max_delay_ms", "must be >= min_delay_ms").into());
        }
        if self.reconnection.connect_timeout_secs == 0 {
            return Err(
                invalid("reconnection.connect_timeout_secs", "must be greater than 0").into(),
            );
        }

        if self.keepalive.interval_secs == 0 {
            return Err(invalid("keepalive.interval_secs", "must be greater than 0").into());
        }
        if self.keepalive.timeout_secs == 0
            || self.keepalive.timeout_secs >= self.keepalive.interval_secs
        {
            return Err(invalid(
                "keepalive.timeout_secs",
                "must be greater than 0 and less than interval_secs",
            )
            .into());
        }

        if self.ingest.batch_size == 0 {
            return Err(invalid("ingest.batch_size", "must be greater than 0").into());
        }
        if self.ingest.queue_capacity < self.ingest.batch_size {
            return Err(invalid("ingest.queue_capacity", "must be >= batch_size").into());
        }
        if self.ingest.max_tracked_vessels == Some(0) {
            return Err(invalid("ingest.max_tracked_vessels", "must be greater than 0").into());
        }
        if self.ingest.summary_interval_secs == 0 {
            return Err(invalid("ingest.summary_interval_secs", "must be greater than 0").into());
        }

        if self.persistence.database.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "persistence.database",
            }
            .into());
        }
        if self.persistence.flush_threshold == 0 {
            return Err(invalid("persistence.flush_threshold", "must be greater than 0").into());
        }
        if self.persistence.flush_interval_secs == 0 {
            return Err(
                invalid("persistence.flush_interval_secs", "must be greater than 0").into(),
            );
        }
        if self.persistence.max_attempts == 0 {
            return Err(invalid("persistence.max_attempts", "must be at least 1").into());
        }

        if !LoggingConfig::FORMATS.contains(&self.logging.format.as_str()) {
            return Err(invalid("logging.format", "must be pretty, compact or json").into());
        }

        let mut names = HashSet::new();
        for region in &self.regions {
            if region.name.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "regions.name",
                }
                .into());
            }
            if !names.insert(region.name.as_str()) {
                return Err(invalid(
                    "regions.name",
                    format!("duplicate region '{}'", region.name),
                )
                .into());
            }
            Region::try_from(region)?;
        }

        Ok(())
    }

    /// Configured regions, or the built-in table when none are configured.
    ///
    /// # Errors
    ///
    /// Returns an error when a configured region has invalid bounds.
    pub fn regions(&self) -> Result<Vec<Region>> {
        if self.regions.is_empty() {
            return Ok(default_regions());
        }
        self.regions
            .iter()
            .map(|r| Region::try_from(r).map_err(Into::into))
            .collect()
    }

    /// Subscription boxes: the configured ones, else one per region.
    ///
    /// # Errors
    ///
    /// Returns an error when a box or region has invalid bounds.
    pub fn bounding_boxes(&self) -> Result<Vec<BoundingBox>> {
        match &self.feed.bounding_boxes {
            Some(boxes) if !boxes.is_empty() => boxes
                .iter()
                .map(|[[south, west], [north, east]]| {
                    BoundingBox::try_new("feed.bounding_boxes", *south, *west, *north, *east)
                        .map_err(Into::into)
                })
                .collect(),
            _ => Ok(self.regions()?.into_iter().map(|r| r.bounds).collect()),
        }
    }

    /// The subscription message sent after every connect.
    ///
    /// # Errors
    ///
    /// Returns an error when a bounding box is invalid.
    pub fn subscription(&self) -> Result<Subscription> {
        Ok(Subscription::new(
            self.feed.api_key.clone(),
            &self.bounding_boxes()?,
        ))
    }

    #[must_use]
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            reconnect_min: self.reconnection.min_delay(),
            reconnect_max: self.reconnection.max_delay(),
            connect_timeout: self.reconnection.connect_timeout(),
            keepalive_interval: Duration::from_secs(self.keepalive.interval_secs),
            keepalive_timeout: Duration::from_secs(self.keepalive.timeout_secs),
        }
    }

    #[must_use]
    pub fn batch_settings(&self) -> BatchSettings {
        BatchSettings {
            batch_size: self.ingest.batch_size,
            summary_interval: Duration::from_secs(self.ingest.summary_interval_secs),
        }
    }

    #[must_use]
    pub fn writer_settings(&self) -> WriterSettings {
        WriterSettings {
            flush_threshold: self.persistence.flush_threshold,
            flush_interval: Duration::from_secs(self.persistence.flush_interval_secs),
            max_attempts: self.persistence.max_attempts,
            retry_delay: Duration::from_millis(self.persistence.retry_delay_ms),
        }
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
