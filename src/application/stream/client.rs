//! Reconnecting feed client.
//!
//! Owns one [`FeedConnection`] and drives it through the connection state
//! machine. Text frames are forwarded, undecoded, into a bounded queue;
//! decoding happens on the consumer side so a slow decoder never stalls the
//! socket read.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::watch;
use tokio::time::{interval_at, sleep, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::backoff::Backoff;
use super::state::{ConnectionState, StreamCounters};
use crate::application::shutdown::wait_for_shutdown;
use crate::error::{Error, Result};
use crate::port::outbound::feed::{FeedConnection, FeedFrame, Subscription};

/// Reconnect and keepalive timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSettings {
    pub reconnect_min: Duration,
    pub reconnect_max: Duration,
    /// Deadline for one connect+subscribe attempt.
    pub connect_timeout: Duration,
    pub keepalive_interval: Duration,
    /// Must be shorter than `keepalive_interval`.
    pub keepalive_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            reconnect_min: Duration::from_secs(2),
            reconnect_max: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            keepalive_interval: Duration::from_secs(20),
            keepalive_timeout: Duration::from_secs(10),
        }
    }
}

/// Why the read loop returned.
enum Exit {
    Stop,
    Lost(String),
}

/// Feed client with automatic reconnection.
pub struct StreamClient<C: FeedConnection> {
    connection: C,
    subscription: Subscription,
    settings: ClientSettings,
    backoff: Backoff,
    state: watch::Sender<ConnectionState>,
    counters: Arc<StreamCounters>,
}

impl<C: FeedConnection> StreamClient<C> {
    #[must_use]
    pub fn new(connection: C, subscription: Subscription, settings: ClientSettings) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            connection,
            subscription,
            backoff: Backoff::new(settings.reconnect_min, settings.reconnect_max),
            settings,
            state,
            counters: Arc::new(StreamCounters::default()),
        }
    }

    /// Observe state transitions.
    #[must_use]
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn counters(&self) -> Arc<StreamCounters> {
        Arc::clone(&self.counters)
    }

    fn set_state(&self, next: ConnectionState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            debug!(from = %current, to = %next, "Stream state change");
            *current = next;
            true
        });
    }

    /// Connect and subscribe within `connect_timeout`.
    async fn open(&mut self) -> Result<()> {
        let limit = self.settings.connect_timeout;
        let attempt = async {
            self.connection.connect().await?;
            self.connection.subscribe(&self.subscription).await
        };
        tokio::time::timeout(limit, attempt).await.map_err(|_| {
            Error::Connection(format!("connect timed out after {}s", limit.as_secs()))
        })?
    }

    /// Run until `shutdown` fires, forwarding text frames into `frames`.
    ///
    /// # Errors
    /// Only the first connect+subscribe can fail, including by timing out;
    /// a feed that was reachable once is retried forever.
    pub async fn run(
        mut self,
        frames: mpsc::Sender<String>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        let feed = self.connection.feed_name();
        self.set_state(ConnectionState::Connecting);

        let opened = tokio::select! {
            result = self.open() => Some(result),
            () = wait_for_shutdown(&mut shutdown) => None,
        };
        match opened {
            None => {
                self.set_state(ConnectionState::Stopped);
                return Ok(());
            }
            Some(Err(e)) => {
                error!(feed, error = %e, "Initial connection failed");
                self.set_state(ConnectionState::Stopped);
                return Err(e);
            }
            Some(Ok(())) => {}
        }
        self.backoff.reset();
        self.set_state(ConnectionState::Connected);
        info!(feed, "Feed connected");

        loop {
            let reason = match self.read_loop(&frames, &mut shutdown).await {
                Exit::Stop => break,
                Exit::Lost(reason) => reason,
            };
            self.counters.disconnect();
            warn!(feed, reason = %reason, "Feed connection lost");

            if !self.reconnect(&mut shutdown).await {
                break;
            }
        }

        self.set_state(ConnectionState::Stopped);
        info!(feed, "Stream client stopped");
        Ok(())
    }

    /// Retry with backoff until connected. Returns `false` on shutdown.
    async fn reconnect(&mut self, shutdown: &mut watch::Receiver<bool>) -> bool {
        let feed = self.connection.feed_name();
        loop {
            self.set_state(ConnectionState::ReconnectWait);
            let delay = self.backoff.next_delay();
            info!(
                feed,
                delay_ms = delay.as_millis() as u64,
                attempt = self.backoff.failures(),
                "Reconnecting after delay"
            );

            tokio::select! {
                () = sleep(delay) => {}
                () = wait_for_shutdown(shutdown) => return false,
            }

            self.set_state(ConnectionState::Connecting);
            let result = tokio::select! {
                result = self.open() => result,
                () = wait_for_shutdown(shutdown) => return false,
            };

            match result {
                Ok(()) => {
                    self.backoff.reset();
                    self.counters.reconnect();
                    self.set_state(ConnectionState::Connected);
                    info!(feed, "Reconnected successfully");
                    return true;
                }
                Err(e) => warn!(feed, error = %e, "Reconnection attempt failed, will retry"),
            }
        }
    }

    /// Read frames until the connection is lost or shutdown is requested.
    async fn read_loop(
        &mut self,
        frames: &mpsc::Sender<String>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Exit {
        let period = self.settings.keepalive_interval;
        let mut keepalive = interval_at(Instant::now() + period, period);
        keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut pong_deadline: Option<Instant> = None;

        loop {
            let deadline = pong_deadline;
            tokio::select! {
                biased;

                () = wait_for_shutdown(shutdown) => return Exit::Stop,

                frame = self.connection.next_frame() => match frame {
                    Some(FeedFrame::Text(text)) => {
                        self.counters.frame();
                        if let Some(exit) = forward(&self.counters, text, frames, shutdown).await {
                            return exit;
                        }
                    }
                    Some(FeedFrame::Pong) => pong_deadline = None,
                    Some(FeedFrame::Disconnected { reason }) => return Exit::Lost(reason),
                    None => return Exit::Lost("stream ended".into()),
                },

                _ = keepalive.tick() => {
                    if let Err(e) = self.connection.ping().await {
                        return Exit::Lost(format!("keepalive ping failed: {e}"));
                    }
                    if pong_deadline.is_none() {
                        pong_deadline = Some(Instant::now() + self.settings.keepalive_timeout);
                    }
                }

                () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.counters.keepalive_timeout();
                    return Exit::Lost("keepalive timeout".into());
                }
            }
        }
    }

}

/// Queue one frame, waiting for room when the queue is full.
async fn forward(
    counters: &StreamCounters,
    text: String,
    frames: &mpsc::Sender<String>,
    shutdown: &mut watch::Receiver<bool>,
) -> Option<Exit> {
    match frames.try_send(text) {
        Ok(()) => None,
        Err(TrySendError::Full(text)) => {
            counters.backpressure_wait();
            tokio::select! {
                sent = frames.send(text) => sent.is_err().then_some(Exit::Stop),
                () = wait_for_shutdown(shutdown) => Some(Exit::Stop),
            }
        }
        Err(TrySendError::Closed(_)) => {
            warn!("Frame consumer gone, stopping stream client");
            Some(Exit::Stop)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::testkit::feed::ScriptedConnection;

    fn settings() -> ClientSettings {
        ClientSettings {
            reconnect_min: Duration::from_secs(2),
            reconnect_max: Duration::from_secs(8),
            connect_timeout: Duration::from_secs(5),
            keepalive_interval: Duration::from_secs(20),
            keepalive_timeout: Duration::from_secs(10),
        }
    }

    fn subscription() -> Subscription {
        Subscription::new("test-key", &[])
    }

    async fn wait_for(state: &mut watch::Receiver<ConnectionState>, want: ConnectionState) {
        while *state.borrow_and_update() != want {
            state.changed().await.unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_connect_failure_is_fatal() {
        let conn = ScriptedConnection::new()
            .with_connect_results(vec![Err(Error::Connection("refused".into()))]);
        let counts = conn.counts();
        let client = StreamClient::new(conn, subscription(), settings());
        let state = client.state();
        let (tx, _rx) = mpsc::channel(8);
        let (_stop_tx, stop_rx) = watch::channel(false);

        assert!(client.run(tx, stop_rx).await.is_err());
        assert_eq!(*state.borrow(), ConnectionState::Stopped);
        assert_eq!(counts.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_first_connect_times_out_as_fatal() {
        let conn = ScriptedConnection::new().with_hanging_connects([1]);
        let counts = conn.counts();
        let client = StreamClient::new(conn, subscription(), settings());
        let state = client.state();
        let (tx, _rx) = mpsc::channel(8);
        let (_stop_tx, stop_rx) = watch::channel(false);

        let started = Instant::now();
        let err = client.run(tx, stop_rx).await.unwrap_err();

        assert!(matches!(err, Error::Connection(ref msg) if msg.contains("timed out")));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(5) && elapsed < Duration::from_secs(6));
        assert_eq!(*state.borrow(), ConnectionState::Stopped);
        assert_eq!(counts.connects.load(Ordering::SeqCst), 1);
        assert_eq!(counts.subscribes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_reconnect_times_out_and_retries() {
        let conn = ScriptedConnection::new()
            .with_hanging_connects([2, 3])
            .with_frames(vec![FeedFrame::Disconnected {
                reason: "reset".into(),
            }]);
        let counts = conn.counts();
        let client = StreamClient::new(conn, subscription(), settings());
        let mut state = client.state();
        let counters = client.counters();
        let (tx, _rx) = mpsc::channel(8);
        let (stop_tx, stop_rx) = watch::channel(false);

        let started = Instant::now();
        let task = tokio::spawn(client.run(tx, stop_rx));

        wait_for(&mut state, ConnectionState::ReconnectWait).await;
        wait_for(&mut state, ConnectionState::Connected).await;

        // 2s wait + 5s hang, 4s wait + 5s hang, then 8s wait.
        assert!(started.elapsed() >= Duration::from_secs(24));
        assert_eq!(counts.connects.load(Ordering::SeqCst), 4);
        assert_eq!(counts.subscribes.load(Ordering::SeqCst), 2);
        assert_eq!(counters.snapshot().reconnects, 1);

        stop_tx.send(true).unwrap();
        task.await.unwrap().unwrap();
        assert_eq!(*state.borrow(), ConnectionState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn forwards_text_frames_in_order() {
        let conn = ScriptedConnection::new().with_frames(vec![
            FeedFrame::Text("a".into()),
            FeedFrame::Text("b".into()),
            FeedFrame::Text("c".into()),
        ]);
        let client = StreamClient::new(conn, subscription(), settings());
        let (tx, mut rx) = mpsc::channel(8);
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(client.run(tx, stop_rx));

        for want in ["a", "b", "c"] {
            assert_eq!(rx.recv().await.as_deref(), Some(want));
        }
        stop_tx.send(true).unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn reconnects_with_backoff_and_resubscribes() {
        let conn = ScriptedConnection::new()
            .with_connect_results(vec![
                Ok(()),
                Err(Error::Connection("down".into())),
                Err(Error::Connection("down".into())),
                Ok(()),
            ])
            .with_frames(vec![FeedFrame::Disconnected {
                reason: "reset".into(),
            }]);
        let counts = conn.counts();
        let client = StreamClient::new(conn, subscription(), settings());
        let mut state = client.state();
        let counters = client.counters();
        let (tx, _rx) = mpsc::channel(8);
        let (stop_tx, stop_rx) = watch::channel(false);

        let started = Instant::now();
        let task = tokio::spawn(client.run(tx, stop_rx));

        wait_for(&mut state, ConnectionState::ReconnectWait).await;
        wait_for(&mut state, ConnectionState::Connected).await;

        // 2s + 4s + 8s of backoff before the fourth connect.
        assert!(started.elapsed() >= Duration::from_secs(14));
        assert_eq!(counts.connects.load(Ordering::SeqCst), 4);
        assert_eq!(counts.subscribes.load(Ordering::SeqCst), 2);
        assert_eq!(counters.snapshot().reconnects, 1);
        assert_eq!(counters.snapshot().disconnects, 1);

        stop_tx.send(true).unwrap();
        task.await.unwrap().unwrap();
        assert_eq!(*state.borrow(), ConnectionState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_pong_triggers_reconnect() {
        let conn = ScriptedConnection::new().without_pongs();
        let counts = conn.counts();
        let client = StreamClient::new(conn, subscription(), settings());
        let mut state = client.state();
        let counters = client.counters();
        let (tx, _rx) = mpsc::channel(8);
        let (stop_tx, stop_rx) = watch::channel(false);

        let started = Instant::now();
        let task = tokio::spawn(client.run(tx, stop_rx));

        wait_for(&mut state, ConnectionState::ReconnectWait).await;
        // First ping at 20s, declared dead 10s later.
        assert!(started.elapsed() >= Duration::from_secs(30));
        assert_eq!(counters.snapshot().keepalive_timeouts, 1);
        assert!(counts.pings.load(Ordering::SeqCst) >= 1);

        stop_tx.send(true).unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn answered_pings_keep_the_connection() {
        let conn = ScriptedConnection::new();
        let counts = conn.counts();
        let client = StreamClient::new(conn, subscription(), settings());
        let state = client.state();
        let (tx, _rx) = mpsc::channel(8);
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(client.run(tx, stop_rx));

        sleep(Duration::from_secs(95)).await;
        assert_eq!(*state.borrow(), ConnectionState::Connected);
        assert_eq!(counts.pings.load(Ordering::SeqCst), 4);
        assert_eq!(counts.connects.load(Ordering::SeqCst), 1);

        stop_tx.send(true).unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_reconnect_wait() {
        let conn = ScriptedConnection::new()
            .with_connect_results(vec![Ok(())])
            .with_frames(vec![FeedFrame::Disconnected {
                reason: "bye".into(),
            }]);
        let settings = ClientSettings {
            reconnect_min: Duration::from_secs(3600),
            reconnect_max: Duration::from_secs(3600),
            ..settings()
        };
        let client = StreamClient::new(conn, subscription(), settings);
        let mut state = client.state();
        let (tx, _rx) = mpsc::channel(8);
        let (stop_tx, stop_rx) = watch::channel(false);

        let started = Instant::now();
        let task = tokio::spawn(client.run(tx, stop_rx));
        wait_for(&mut state, ConnectionState::ReconnectWait).await;

        stop_tx.send(true).unwrap();
        task.await.unwrap().unwrap();
        assert!(started.elapsed() < Duration::from_secs(3600));
        assert_eq!(*state.borrow(), ConnectionState::Stopped);
    }
}
