//! Mock [`FeedConnection`] implementations for testing.
//!
//! - [`ScriptedConnection`]: pre-loaded connect/subscribe results, connect
//!   attempts that never complete, and a fixed frame queue. Best for
//!   reconnection and keepalive behavior.
//! - [`ChannelConnection`]: frames pushed on demand through a
//!   [`ChannelConnectionHandle`]. Best for end-to-end pipeline tests.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::port::outbound::feed::{FeedConnection, FeedFrame, Subscription};

/// Call counters shared between a mock connection and the test.
#[derive(Debug, Default)]
pub struct ConnectionCounts {
    pub connects: AtomicU32,
    pub subscribes: AtomicU32,
    pub pings: AtomicU32,
}

// ---------------------------------------------------------------------------
// ScriptedConnection
// ---------------------------------------------------------------------------

/// A mock connection with scripted results and a fixed frame queue.
///
/// Each `connect()`/`subscribe()` pops the next scripted result (`Ok(())`
/// once exhausted). Every `ping()` is answered with a `Pong` frame unless
/// [`without_pongs`](Self::without_pongs) was set. Once the frame queue is
/// empty the connection is quiet: `next_frame()` only yields pongs.
pub struct ScriptedConnection {
    connect_results: VecDeque<Result<()>>,
    subscribe_results: VecDeque<Result<()>>,
    hanging_connects: HashSet<u32>,
    frames: VecDeque<FeedFrame>,
    pongs: VecDeque<FeedFrame>,
    answer_pings: bool,
    counts: Arc<ConnectionCounts>,
}

impl ScriptedConnection {
    pub fn new() -> Self {
        Self {
            connect_results: VecDeque::new(),
            subscribe_results: VecDeque::new(),
            hanging_connects: HashSet::new(),
            frames: VecDeque::new(),
            pongs: VecDeque::new(),
            answer_pings: true,
            counts: Arc::new(ConnectionCounts::default()),
        }
    }

    pub fn with_connect_results(mut self, results: Vec<Result<()>>) -> Self {
        self.connect_results = results.into();
        self
    }

    pub fn with_subscribe_results(mut self, results: Vec<Result<()>>) -> Self {
        self.subscribe_results = results.into();
        self
    }

    /// Connect attempts (1-based) that never complete, like a peer that
    /// accepts TCP but never finishes the handshake.
    pub fn with_hanging_connects(mut self, attempts: impl IntoIterator<Item = u32>) -> Self {
        self.hanging_connects = attempts.into_iter().collect();
        self
    }

    pub fn with_frames(mut self, frames: Vec<FeedFrame>) -> Self {
        self.frames = frames.into();
        self
    }

    /// Never answer pings, simulating a half-open socket.
    pub fn without_pongs(mut self) -> Self {
        self.answer_pings = false;
        self
    }

    pub fn counts(&self) -> Arc<ConnectionCounts> {
        Arc::clone(&self.counts)
    }
}

impl Default for ScriptedConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedConnection for ScriptedConnection {
    async fn connect(&mut self) -> Result<()> {
        let attempt = self.counts.connects.fetch_add(1, Ordering::SeqCst) + 1;
        if self.hanging_connects.contains(&attempt) {
            std::future::pending::<()>().await;
        }
        self.connect_results.pop_front().unwrap_or(Ok(()))
    }

    async fn subscribe(&mut self, _: &Subscription) -> Result<()> {
        self.counts.subscribes.fetch_add(1, Ordering::SeqCst);
        self.subscribe_results.pop_front().unwrap_or(Ok(()))
    }

    async fn next_frame(&mut self) -> Option<FeedFrame> {
        if let Some(pong) = self.pongs.pop_front() {
            return Some(pong);
        }
        if let Some(frame) = self.frames.pop_front() {
            return Some(frame);
        }
        // Quiet but alive.
        std::future::pending().await
    }

    async fn ping(&mut self) -> Result<()> {
        self.counts.pings.fetch_add(1, Ordering::SeqCst);
        if self.answer_pings {
            self.pongs.push_back(FeedFrame::Pong);
        }
        Ok(())
    }

    fn feed_name(&self) -> &'static str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// ChannelConnection
// ---------------------------------------------------------------------------

/// A mock connection fed externally through a [`ChannelConnectionHandle`].
///
/// Pings are always answered.
pub struct ChannelConnection {
    frame_rx: mpsc::UnboundedReceiver<FeedFrame>,
    pongs: u32,
    counts: Arc<ConnectionCounts>,
    subscriptions: Arc<Mutex<Vec<Subscription>>>,
}

/// Control handle for a [`ChannelConnection`].
pub struct ChannelConnectionHandle {
    frame_tx: mpsc::UnboundedSender<FeedFrame>,
    counts: Arc<ConnectionCounts>,
    subscriptions: Arc<Mutex<Vec<Subscription>>>,
}

impl ChannelConnectionHandle {
    /// Deliver one raw text frame.
    pub fn send_text(&self, text: impl Into<String>) {
        let _ = self.frame_tx.send(FeedFrame::Text(text.into()));
    }

    /// Drop the connection with `reason`.
    pub fn disconnect(&self, reason: &str) {
        let _ = self.frame_tx.send(FeedFrame::Disconnected {
            reason: reason.to_string(),
        });
    }

    pub fn connect_count(&self) -> u32 {
        self.counts.connects.load(Ordering::SeqCst)
    }

    pub fn subscribe_count(&self) -> u32 {
        self.counts.subscribes.load(Ordering::SeqCst)
    }

    /// Every subscription sent so far, oldest first.
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.subscriptions.lock().clone()
    }
}

/// Create a [`ChannelConnection`] and its control handle.
pub fn channel_connection() -> (ChannelConnection, ChannelConnectionHandle) {
    let (tx, rx) = mpsc::unbounded_channel();
    let counts = Arc::new(ConnectionCounts::default());
    let subscriptions = Arc::new(Mutex::new(Vec::new()));
    (
        ChannelConnection {
            frame_rx: rx,
            pongs: 0,
            counts: Arc::clone(&counts),
            subscriptions: Arc::clone(&subscriptions),
        },
        ChannelConnectionHandle {
            frame_tx: tx,
            counts,
            subscriptions,
        },
    )
}

#[async_trait]
impl FeedConnection for ChannelConnection {
    async fn connect(&mut self) -> Result<()> {
        self.counts.connects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn subscribe(&mut self, subscription: &Subscription) -> Result<()> {
        self.counts.subscribes.fetch_add(1, Ordering::SeqCst);
        self.subscriptions.lock().push(subscription.clone());
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<FeedFrame> {
        if self.pongs > 0 {
            self.pongs -= 1;
            return Some(FeedFrame::Pong);
        }
        self.frame_rx.recv().await
    }

    async fn ping(&mut self) -> Result<()> {
        self.counts.pings.fetch_add(1, Ordering::SeqCst);
        self.pongs += 1;
        Ok(())
    }

    fn feed_name(&self) -> &'static str {
        "mock"
    }
}
