//! Feed connection port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::region::BoundingBox;
use crate::domain::update::FeedMessage;
use crate::error::Result;

/// What a feed connection yields to its reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedFrame {
    /// A text payload; decoding happens downstream.
    Text(String),
    /// Keepalive acknowledgement.
    Pong,
    /// The connection is gone (close frame, protocol error, reset).
    Disconnected { reason: String },
}

/// Subscription sent after every successful connect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subscription {
    #[serde(rename = "APIKey")]
    pub api_key: String,
    #[serde(rename = "BoundingBoxes")]
    pub bounding_boxes: Vec<[[f64; 2]; 2]>,
    #[serde(rename = "FilterMessageTypes")]
    pub message_types: Vec<String>,
}

impl Subscription {
    /// Message types this pipeline decodes.
    pub const MESSAGE_TYPES: [&'static str; 2] = ["PositionReport", "ShipStaticData"];

    #[must_use]
    pub fn new(api_key: impl Into<String>, boxes: &[BoundingBox]) -> Self {
        Self {
            api_key: api_key.into(),
            bounding_boxes: boxes.iter().map(BoundingBox::corners).collect(),
            message_types: Self::MESSAGE_TYPES.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

/// A single logical connection to the vessel feed.
///
/// Implementations only move frames; reconnect policy and keepalive
/// timing live in the stream client that drives them.
#[async_trait]
pub trait FeedConnection: Send {
    /// Open the underlying transport, replacing any previous one.
    async fn connect(&mut self) -> Result<()>;

    /// Send the subscription request on the open transport.
    async fn subscribe(&mut self, subscription: &Subscription) -> Result<()>;

    /// Wait for the next frame. `None` means the transport ended or was
    /// never opened.
    async fn next_frame(&mut self) -> Option<FeedFrame>;

    /// Send a keepalive ping.
    async fn ping(&mut self) -> Result<()>;

    /// Feed name for logging.
    fn feed_name(&self) -> &'static str;
}

#[async_trait]
impl FeedConnection for Box<dyn FeedConnection> {
    async fn connect(&mut self) -> Result<()> {
        (**self).connect().await
    }

    async fn subscribe(&mut self, subscription: &Subscription) -> Result<()> {
        (**self).subscribe(subscription).await
    }

    async fn next_frame(&mut self) -> Option<FeedFrame> {
        (**self).next_frame().await
    }

    async fn ping(&mut self) -> Result<()> {
        (**self).ping().await
    }

    fn feed_name(&self) -> &'static str {
        (**self).feed_name()
    }
}

/// Why a frame could not be decoded. The frame is dropped and counted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("malformed frame: {0}")]
    Malformed(String),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Turns raw text frames into typed feed messages.
pub trait FrameDecoder: Send + Sync + 'static {
    /// Decode one frame received at `received_at`.
    ///
    /// # Errors
    /// Returns a [`DecodeError`] when the frame is malformed or names no
    /// valid vessel.
    fn decode(
        &self,
        text: &str,
        received_at: DateTime<Utc>,
    ) -> std::result::Result<FeedMessage, DecodeError>;
}
