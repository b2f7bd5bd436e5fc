//! aisstream.io WebSocket connection.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{info, trace, warn};

use crate::error::{Error, Result};
use crate::port::outbound::feed::{FeedConnection, FeedFrame, Subscription};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Feed connection over a tokio-tungstenite WebSocket.
///
/// Holds at most one socket; `connect` replaces it.
pub struct AisStreamConnection {
    url: String,
    ws: Option<Socket>,
}

impl AisStreamConnection {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ws: None,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.ws.is_some()
    }

    fn socket(&mut self) -> Result<&mut Socket> {
        self.ws
            .as_mut()
            .ok_or_else(|| Error::Connection("Not connected".into()))
    }
}

#[async_trait]
impl FeedConnection for AisStreamConnection {
    async fn connect(&mut self) -> Result<()> {
        self.ws = None;
        info!(url = %self.url, "Connecting to WebSocket");
        let (ws_stream, response) = connect_async(self.url.as_str()).await?;
        info!(status = %response.status(), "WebSocket connected");
        self.ws = Some(ws_stream);
        Ok(())
    }

    async fn subscribe(&mut self, subscription: &Subscription) -> Result<()> {
        let json = serde_json::to_string(subscription)?;
        info!(
            boxes = subscription.bounding_boxes.len(),
            types = ?subscription.message_types,
            "Subscribing to feed"
        );
        self.socket()?.send(Message::Text(json)).await?;
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<FeedFrame> {
        let ws = self.ws.as_mut()?;

        loop {
            let Some(msg) = ws.next().await else {
                self.ws = None;
                return Some(FeedFrame::Disconnected {
                    reason: "stream ended".into(),
                });
            };

            match msg {
                Ok(Message::Text(text)) => {
                    trace!(bytes = text.len(), "Received WebSocket text frame");
                    return Some(FeedFrame::Text(text));
                }
                // The feed sends JSON as binary frames on some endpoints.
                Ok(Message::Binary(data)) => {
                    trace!(bytes = data.len(), "Received WebSocket binary frame");
                    return Some(FeedFrame::Text(String::from_utf8_lossy(&data).into_owned()));
                }
                Ok(Message::Pong(_)) => return Some(FeedFrame::Pong),
                Ok(Message::Close(frame)) => {
                    info!(frame = ?frame, "WebSocket closed by server");
                    self.ws = None;
                    return Some(FeedFrame::Disconnected {
                        reason: frame.map(|f| f.reason.to_string()).unwrap_or_default(),
                    });
                }
                // Pings are answered by tungstenite on the next read or write.
                Ok(_) => continue,
                Err(e) => {
                    warn!(error = %e, "WebSocket error");
                    self.ws = None;
                    return Some(FeedFrame::Disconnected {
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    async fn ping(&mut self) -> Result<()> {
        self.socket()?.send(Message::Ping(Vec::new())).await?;
        Ok(())
    }

    fn feed_name(&self) -> &'static str {
        "aisstream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_disconnected() {
        let conn = AisStreamConnection::new("wss://stream.aisstream.io/v0/stream");
        assert!(!conn.is_open());
        assert_eq!(conn.feed_name(), "aisstream");
    }

    #[tokio::test]
    async fn operations_before_connect_fail_cleanly() {
        let mut conn = AisStreamConnection::new("wss://stream.aisstream.io/v0/stream");
        assert!(conn.next_frame().await.is_none());
        assert!(matches!(conn.ping().await, Err(Error::Connection(_))));
        let sub = Subscription::new("key", &[]);
        assert!(conn.subscribe(&sub).await.is_err());
    }
}
