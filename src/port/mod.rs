//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!          ┌───────────────────────────┐
//!          │        Application        │
//!          │  caches, ingest, persist  │
//!          └─────┬───────────────┬─────┘
//!                │               │
//!                ▼               ▼
//!         ┌────────────┐  ┌────────────┐
//!         │    Feed    │  │   Store    │
//!         │  Adapter   │  │  Adapter   │
//!         └────────────┘  └────────────┘
//! ```
//!
//! - [`FeedConnection`] - live AIS feed (WebSocket in production)
//! - [`FrameDecoder`] - feed wire format
//! - [`VesselStore`] - durable vessel storage

pub mod outbound;

pub use outbound::feed::{DecodeError, FeedConnection, FeedFrame, FrameDecoder, Subscription};
pub use outbound::store::VesselStore;
