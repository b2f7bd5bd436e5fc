//! Frame consumer: drains the frame queue in batches, decodes each frame
//! and hands the accepted updates to the [`Coordinator`].

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::application::ingest::{BatchReport, Coordinator};
use crate::application::shutdown::wait_for_shutdown;
use crate::port::outbound::feed::FrameDecoder;

/// Batch consumer tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    /// Most frames taken from the queue per batch.
    pub batch_size: usize,
    /// Period of the activity summary log line.
    pub summary_interval: Duration,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            batch_size: 50,
            summary_interval: Duration::from_secs(45),
        }
    }
}

/// Consumes raw frames produced by the stream client.
pub struct FrameBatcher {
    decoder: Arc<dyn FrameDecoder>,
    coordinator: Arc<Coordinator>,
    settings: BatchSettings,
}

impl FrameBatcher {
    #[must_use]
    pub fn new(
        decoder: Arc<dyn FrameDecoder>,
        coordinator: Arc<Coordinator>,
        settings: BatchSettings,
    ) -> Self {
        Self {
            decoder,
            coordinator,
            settings,
        }
    }

    /// Decode and apply one batch of raw frames.
    ///
    /// Undecodable frames are counted and skipped; they never abort the
    /// batch.
    pub fn process(&self, frames: &[String]) -> BatchReport {
        let received_at = Utc::now();
        let counters = self.coordinator.counters();
        let mut updates = Vec::with_capacity(frames.len());
        let (mut malformed, mut unknown) = (0u64, 0u64);

        for text in frames {
            match self.decoder.decode(text, received_at) {
                Ok(message) => match message.into_update() {
                    Some(update) => updates.push(update),
                    None => unknown += 1,
                },
                Err(e) => {
                    malformed += 1;
                    debug!(error = %e, "Dropping undecodable frame");
                }
            }
        }

        counters.add_decoded(updates.len() as u64);
        counters.add_malformed(malformed);
        counters.add_unknown(unknown);
        self.coordinator.process_batch(&updates)
    }

    /// Run until shutdown or until every producer is gone.
    ///
    /// Frames still queued at shutdown are discarded.
    pub async fn run(self, mut frames: mpsc::Receiver<String>, mut shutdown: watch::Receiver<bool>) {
        let batch_size = self.settings.batch_size.max(1);
        let mut buf: Vec<String> = Vec::with_capacity(batch_size);
        let period = self.settings.summary_interval;
        let mut summary = interval_at(Instant::now() + period, period);
        summary.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                () = wait_for_shutdown(&mut shutdown) => break,

                received = frames.recv_many(&mut buf, batch_size) => {
                    if received == 0 {
                        break;
                    }
                    self.process(&buf);
                    buf.clear();
                }

                _ = summary.tick() => self.log_summary(),
            }
        }

        frames.close();
        let mut discarded = 0usize;
        while frames.try_recv().is_ok() {
            discarded += 1;
        }
        if discarded > 0 {
            info!(discarded, "Discarded queued frames on shutdown");
        }
        self.log_summary();
    }

    fn log_summary(&self) {
        let vessels = self.coordinator.vessels().statistics();
        let regions = self.coordinator.regions().statistics();
        let ingest = self.coordinator.counters().snapshot();
        let durability = self.coordinator.writer().status();
        info!(
            vessels = vessels.total,
            tankers = vessels.tankers(),
            cargo = vessels.cargo(),
            region_entries = regions.region_entries,
            accepted = ingest.accepted,
            malformed = ingest.malformed,
            unknown = ingest.unknown,
            rejected_capacity = ingest.rejected_capacity,
            pending_writes = self.coordinator.writer().pending(),
            durability_degraded = durability.degraded,
            lost_records = durability.lost_records,
            "Ingest summary"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::aisstream::AisStreamDecoder;
    use crate::application::cache::{RegionCache, VesselCache};
    use crate::application::ingest::IngestCounters;
    use crate::application::persistence::{PersistenceWriter, WriterSettings};
    use crate::domain::region::default_regions;
    use crate::testkit::domain::{position_frame, static_frame, vessel_id};
    use crate::testkit::store::MemoryStore;

    fn batcher(batch_size: usize) -> FrameBatcher {
        let writer = PersistenceWriter::new(Arc::new(MemoryStore::new()), WriterSettings::default());
        let coordinator = Coordinator::new(
            Arc::new(VesselCache::new()),
            Arc::new(RegionCache::new(default_regions())),
            Arc::new(writer),
            Arc::new(IngestCounters::default()),
        );
        FrameBatcher::new(
            Arc::new(AisStreamDecoder),
            Arc::new(coordinator),
            BatchSettings {
                batch_size,
                summary_interval: Duration::from_secs(3600),
            },
        )
    }

    #[test]
    fn bad_frames_are_counted_not_fatal() {
        let batcher = batcher(10);
        let frames = vec![
            position_frame(244_660_000, 26.5, 52.0),
            "{not json".to_string(),
            r#"{"MessageType":"BaseStationReport","Message":{}}"#.to_string(),
            static_frame(244_660_000, "GULF STAR", 80),
        ];

        let report = batcher.process(&frames);
        assert_eq!(report.applied, 2);

        let counters = batcher.coordinator.counters().snapshot();
        assert_eq!(counters.decoded, 2);
        assert_eq!(counters.malformed, 1);
        assert_eq!(counters.unknown, 1);

        let record = batcher.coordinator.vessels().vessel(vessel_id(244_660_000)).unwrap();
        assert_eq!(record.name.as_deref(), Some("GULF STAR"));
        assert!(batcher
            .coordinator
            .regions()
            .contains("persian_gulf", vessel_id(244_660_000)));
    }

    #[test]
    fn frames_without_a_usable_vessel_id_never_reach_the_cache() {
        let batcher = batcher(10);
        batcher.process(&[position_frame(244_660_000, 26.5, 52.0)]);
        let coordinator = &batcher.coordinator;

        let bad_ids = [
            r#"{"MessageType":"PositionReport","MetaData":{"MMSI":244660001},"Message":{"PositionReport":{"Latitude":26.5,"Longitude":52.0}}}"#,
            r#"{"MessageType":"PositionReport","Message":{"PositionReport":{"UserID":"abc","Latitude":26.5,"Longitude":52.0}}}"#,
            r#"{"MessageType":"PositionReport","Message":{"PositionReport":{"UserID":0,"Latitude":26.5,"Longitude":52.0}}}"#,
        ];
        for (i, frame) in bad_ids.into_iter().enumerate() {
            let report = batcher.process(&[frame.to_string()]);

            assert_eq!(report.applied, 0, "{frame}");
            assert_eq!(coordinator.vessels().len(), 1, "{frame}");
            assert_eq!(coordinator.regions().statistics().region_entries, 1, "{frame}");
            assert_eq!(coordinator.counters().snapshot().malformed, i as u64 + 1, "{frame}");
        }
        assert_eq!(coordinator.counters().snapshot().decoded, 1);
    }

    #[tokio::test]
    async fn drains_queue_in_batches_until_producer_closes() {
        let batcher = batcher(3);
        let coordinator = Arc::clone(&batcher.coordinator);
        let (tx, rx) = mpsc::channel(16);
        for raw in 1..=7 {
            tx.send(position_frame(raw, 1.0, 1.0)).await.unwrap();
        }
        drop(tx);
        let (_stop_tx, stop_rx) = watch::channel(false);

        batcher.run(rx, stop_rx).await;

        let counters = coordinator.counters().snapshot();
        assert_eq!(counters.accepted, 7);
        assert_eq!(counters.batches, 3);
        assert_eq!(coordinator.vessels().len(), 7);
    }

    #[tokio::test]
    async fn shutdown_discards_queued_frames() {
        let batcher = batcher(3);
        let coordinator = Arc::clone(&batcher.coordinator);
        let (tx, rx) = mpsc::channel(16);
        tx.send(position_frame(1, 1.0, 1.0)).await.unwrap();
        let (stop_tx, stop_rx) = watch::channel(false);
        stop_tx.send(true).unwrap();

        batcher.run(rx, stop_rx).await;

        assert_eq!(coordinator.counters().snapshot().accepted, 0);
        assert!(tx.is_closed());
    }
}
