//! aisstream.io feed adapter.
//!
//! - [`message`] - wire types and the frame decoder
//! - [`stream`] - WebSocket [`FeedConnection`](crate::port::FeedConnection)

pub mod message;
pub mod stream;

pub use message::{decode, AisStreamDecoder};
pub use stream::AisStreamConnection;
