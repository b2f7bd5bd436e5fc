//! Pipeline lifecycle: wiring, task spawning, status and stop.
//!
//! Three tasks run per pipeline:
//!
//! - read task: [`StreamClient`] owning the feed connection
//! - batch task: [`FrameBatcher`] draining the frame queue into the
//!   [`Coordinator`]
//! - flush task: [`PersistenceWriter::run`]
//!
//! They share one shutdown channel. Nothing here is global, so a process
//! can run several pipelines side by side.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::cache::{RegionCache, VesselCache};
use crate::application::ingest::{Coordinator, IngestCounters, IngestCountersSnapshot};
use crate::application::persistence::{DurabilityStatus, FlushReport, PersistenceWriter};
use crate::application::stream::{
    ConnectionState, FrameBatcher, StreamClient, StreamCounters, StreamCountersSnapshot,
};
use crate::error::{Error, PersistenceError, Result};
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::feed::{FeedConnection, FrameDecoder};
use crate::port::outbound::store::VesselStore;

/// User-visible pipeline health.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineStatus {
    pub connection: ConnectionState,
    pub vessels: usize,
    pub pending_writes: usize,
    pub durability: DurabilityStatus,
    pub stream: StreamCountersSnapshot,
    pub ingest: IngestCountersSnapshot,
}

/// Pipeline builder.
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Hydrate caches from `store`, connect, and spawn the pipeline tasks.
    ///
    /// Returns once the first connection is established.
    ///
    /// # Errors
    /// Returns an error when stored records cannot be read, the region table
    /// is invalid, or the first connect+subscribe fails.
    pub async fn start(
        self,
        connection: Box<dyn FeedConnection>,
        store: Arc<dyn VesselStore>,
        decoder: Arc<dyn FrameDecoder>,
    ) -> Result<PipelineHandle> {
        let config = self.config;
        let subscription = config.subscription()?;

        let vessels = Arc::new(VesselCache::with_capacity_limit(
            config.ingest.max_tracked_vessels,
        ));
        let regions = Arc::new(RegionCache::new(config.regions()?));
        let writer = Arc::new(PersistenceWriter::new(
            Arc::clone(&store),
            config.writer_settings(),
        ));

        let stored = writer.get_all().await?;
        for record in &stored {
            if let Some((lat, lon)) = record.position() {
                regions.update(record.id, lat, lon);
            }
        }
        let hydrated = vessels.hydrate(stored);
        info!(vessels = hydrated, regions = regions.regions().len(), "Caches hydrated");

        let coordinator = Arc::new(Coordinator::new(
            vessels,
            regions,
            Arc::clone(&writer),
            Arc::new(IngestCounters::default()),
        ));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (frame_tx, frame_rx) = mpsc::channel(config.ingest.queue_capacity);

        let client = StreamClient::new(connection, subscription, config.client_settings());
        let mut state = client.state();
        let stream_counters = client.counters();
        let client_task = tokio::spawn(client.run(frame_tx, shutdown_rx.clone()));

        let connected = state
            .wait_for(|s| matches!(s, ConnectionState::Connected | ConnectionState::Stopped))
            .await
            .is_ok_and(|s| s.is_connected());
        if !connected {
            let _ = shutdown_tx.send(true);
            return Err(match client_task.await {
                Ok(Err(e)) => e,
                Ok(Ok(())) => Error::Connection("feed stopped before connecting".into()),
                Err(e) => Error::Connection(format!("stream task failed: {e}")),
            });
        }

        let batcher = FrameBatcher::new(decoder, Arc::clone(&coordinator), config.batch_settings());
        let batch_task = tokio::spawn(batcher.run(frame_rx, shutdown_rx.clone()));
        let flush_task = tokio::spawn(Arc::clone(&writer).run(shutdown_rx));

        info!(
            queue_capacity = config.ingest.queue_capacity,
            batch_size = config.ingest.batch_size,
            flush_threshold = config.persistence.flush_threshold,
            "Pipeline started"
        );

        Ok(PipelineHandle {
            shutdown: shutdown_tx,
            state,
            stream_counters,
            coordinator,
            client_task,
            batch_task,
            flush_task,
        })
    }
}

/// Running pipeline.
pub struct PipelineHandle {
    shutdown: watch::Sender<bool>,
    state: watch::Receiver<ConnectionState>,
    stream_counters: Arc<StreamCounters>,
    coordinator: Arc<Coordinator>,
    client_task: JoinHandle<Result<()>>,
    batch_task: JoinHandle<()>,
    flush_task: JoinHandle<()>,
}

impl PipelineHandle {
    /// Current connection state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Observe connection state transitions.
    #[must_use]
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    #[must_use]
    pub fn vessels(&self) -> &Arc<VesselCache> {
        self.coordinator.vessels()
    }

    #[must_use]
    pub fn regions(&self) -> &Arc<RegionCache> {
        self.coordinator.regions()
    }

    #[must_use]
    pub fn writer(&self) -> &Arc<PersistenceWriter> {
        self.coordinator.writer()
    }

    #[must_use]
    pub fn status(&self) -> PipelineStatus {
        let writer = self.coordinator.writer();
        PipelineStatus {
            connection: self.connection_state(),
            vessels: self.coordinator.vessels().len(),
            pending_writes: writer.pending(),
            durability: writer.status(),
            stream: self.stream_counters.snapshot(),
            ingest: self.coordinator.counters().snapshot(),
        }
    }

    /// Stop every task, then flush whatever is still pending.
    ///
    /// Queued frames that were not yet decoded are discarded.
    ///
    /// # Errors
    /// Returns [`PersistenceError::RetriesExhausted`] when the final flush
    /// fails; the caches are unaffected.
    pub async fn stop(self) -> Result<FlushReport> {
        info!("Stopping pipeline");
        let _ = self.shutdown.send(true);

        match self.client_task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Stream client exited with error"),
            Err(e) => error!(error = %e, "Stream client task failed"),
        }
        for (name, task) in [("batch", self.batch_task), ("flush", self.flush_task)] {
            if let Err(e) = task.await {
                error!(task = name, error = %e, "Pipeline task failed");
            }
        }

        let report = self
            .coordinator
            .writer()
            .flush()
            .await
            .map_err(|e: PersistenceError| {
                error!(error = %e, "Final flush failed");
                Error::Persistence(e)
            })?;
        info!(records = report.records, "Pipeline stopped");
        Ok(report)
    }
}
