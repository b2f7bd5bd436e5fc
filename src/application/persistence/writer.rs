//! Batched, retried persistence of vessel snapshots.
//!
//! The ingest path only ever touches the in-memory [`WriteBuffer`]; the
//! store is called from the flush task on the blocking pool. A flush that
//! still fails after every retry drops its batch, marks durability as
//! degraded and keeps ingestion running.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{watch, Notify};
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

use super::buffer::WriteBuffer;
use crate::application::shutdown::wait_for_shutdown;
use crate::domain::{id::VesselId, vessel::VesselRecord};
use crate::error::{PersistenceError, Result};
use crate::port::outbound::store::VesselStore;

/// Flush policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterSettings {
    /// Pending records that seal a batch.
    pub flush_threshold: usize,
    /// Longest a pending record waits for a flush.
    pub flush_interval: Duration,
    /// Attempts per batch, including the first.
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for WriterSettings {
    fn default() -> Self {
        Self {
            flush_threshold: 100,
            flush_interval: Duration::from_secs(5),
            max_attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// What caused a flush request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    /// A batch reached the threshold; only sealed batches are written.
    Size,
    /// The interval elapsed; everything pending is written.
    Time,
}

/// Durability health, readable at any time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DurabilityStatus {
    /// Set when a batch was dropped; cleared by the next successful flush.
    pub degraded: bool,
    /// Records dropped after exhausting retries, over the writer's lifetime.
    pub lost_records: u64,
    pub last_error: Option<String>,
    pub last_flush_at: Option<DateTime<Utc>>,
    pub flushes: u64,
    pub flushed_records: u64,
}

/// Outcome of one successful flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub records: usize,
    pub attempts: u32,
}

/// Buffers snapshots and writes them to a [`VesselStore`] in batches.
pub struct PersistenceWriter {
    store: Arc<dyn VesselStore>,
    settings: WriterSettings,
    buffer: Mutex<WriteBuffer>,
    /// Serializes flushes so batches commit in order.
    flush_lock: tokio::sync::Mutex<()>,
    wake: Notify,
    full_flush: AtomicBool,
    last_flush: Mutex<Instant>,
    status: Mutex<DurabilityStatus>,
}

impl PersistenceWriter {
    #[must_use]
    pub fn new(store: Arc<dyn VesselStore>, settings: WriterSettings) -> Self {
        Self {
            store,
            buffer: Mutex::new(WriteBuffer::new(settings.flush_threshold)),
            settings,
            flush_lock: tokio::sync::Mutex::new(()),
            wake: Notify::new(),
            full_flush: AtomicBool::new(false),
            last_flush: Mutex::new(Instant::now()),
            status: Mutex::new(DurabilityStatus::default()),
        }
    }

    #[must_use]
    pub fn settings(&self) -> WriterSettings {
        self.settings
    }

    /// Queue a snapshot. Returns `true` when a batch was sealed.
    ///
    /// Never blocks on I/O; safe to call while holding a cache entry lock.
    pub fn enqueue(&self, record: VesselRecord) -> bool {
        self.buffer.lock().push(record)
    }

    /// Ask the flush task to run. `Time` flushes everything pending.
    pub fn request_flush(&self, trigger: FlushTrigger) {
        if trigger == FlushTrigger::Time {
            self.full_flush.store(true, Ordering::Release);
        }
        self.wake.notify_one();
    }

    /// A sealed batch is waiting.
    #[must_use]
    pub fn has_sealed(&self) -> bool {
        self.buffer.lock().has_sealed()
    }

    /// Records are pending and the flush interval has elapsed.
    #[must_use]
    pub fn flush_due(&self) -> bool {
        !self.buffer.lock().is_empty()
            && self.last_flush.lock().elapsed() >= self.settings.flush_interval
    }

    /// Records queued but not yet handed to the store.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.lock().len()
    }

    #[must_use]
    pub fn status(&self) -> DurabilityStatus {
        self.status.lock().clone()
    }

    /// Write everything pending.
    ///
    /// # Errors
    /// Returns [`PersistenceError::RetriesExhausted`] when the batch could
    /// not be written; the batch is dropped.
    pub async fn flush(&self) -> std::result::Result<FlushReport, PersistenceError> {
        let _guard = self.flush_lock.lock().await;
        let batch = self.buffer.lock().take_all();
        self.write(batch).await
    }

    /// Write only batches that reached the threshold.
    ///
    /// # Errors
    /// Same as [`flush`](Self::flush).
    pub async fn flush_sealed(&self) -> std::result::Result<FlushReport, PersistenceError> {
        let _guard = self.flush_lock.lock().await;
        let batch = self.buffer.lock().take_sealed();
        self.write(batch).await
    }

    async fn write(&self, batch: Vec<VesselRecord>) -> std::result::Result<FlushReport, PersistenceError> {
        *self.last_flush.lock() = Instant::now();
        if batch.is_empty() {
            return Ok(FlushReport::default());
        }

        let records = batch.len();
        let batch = Arc::new(batch);
        let max_attempts = self.settings.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            let store = Arc::clone(&self.store);
            let rows = Arc::clone(&batch);
            let result = tokio::task::spawn_blocking(move || store.save_batch(&rows)).await;

            match result {
                Ok(Ok(written)) => {
                    self.record_success(written);
                    debug!(records = written, attempt, "Flushed vessel batch");
                    return Ok(FlushReport {
                        records: written,
                        attempts: attempt,
                    });
                }
                Ok(Err(e)) => last_error = e.to_string(),
                Err(e) => last_error = PersistenceError::TaskFailed(e.to_string()).to_string(),
            }

            if attempt < max_attempts {
                warn!(
                    records,
                    attempt,
                    max_attempts,
                    error = %last_error,
                    "Batch write failed, retrying"
                );
                sleep(self.settings.retry_delay).await;
            }
        }

        let failure = PersistenceError::RetriesExhausted {
            records,
            attempts: max_attempts,
            reason: last_error,
        };
        self.record_failure(records, &failure);
        error!(error = %failure, "Dropping vessel batch");
        Err(failure)
    }

    fn record_success(&self, written: usize) {
        let mut status = self.status.lock();
        if status.degraded {
            info!("Durability restored");
        }
        status.degraded = false;
        status.last_flush_at = Some(Utc::now());
        status.flushes += 1;
        status.flushed_records += written as u64;
    }

    fn record_failure(&self, records: usize, failure: &PersistenceError) {
        let mut status = self.status.lock();
        status.degraded = true;
        status.lost_records += records as u64;
        status.last_error = Some(failure.to_string());
    }

    /// Latest stored snapshot for `id`.
    ///
    /// # Errors
    /// Returns the store's error.
    pub async fn get(&self, id: VesselId) -> Result<Option<VesselRecord>> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.get(id))
            .await
            .map_err(|e| PersistenceError::TaskFailed(e.to_string()))?
    }

    /// Every stored snapshot.
    ///
    /// # Errors
    /// Returns the store's error.
    pub async fn get_all(&self) -> Result<Vec<VesselRecord>> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.get_all())
            .await
            .map_err(|e| PersistenceError::TaskFailed(e.to_string()))?
    }

    /// Flush task: writes sealed batches on request and everything pending
    /// once per interval. Returns on shutdown without a final flush; the
    /// owner decides whether to flush after stopping.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!(
            threshold = self.settings.flush_threshold,
            interval_ms = self.settings.flush_interval.as_millis() as u64,
            "Persistence writer started"
        );

        loop {
            let since_last = self.last_flush.lock().elapsed();
            let until_due = self.settings.flush_interval.saturating_sub(since_last);

            tokio::select! {
                () = wait_for_shutdown(&mut shutdown) => break,

                () = self.wake.notified() => {
                    // Failures are already recorded in the status.
                    let _ = if self.full_flush.swap(false, Ordering::AcqRel) {
                        self.flush().await
                    } else {
                        self.flush_sealed().await
                    };
                }

                () = sleep(until_due) => {
                    let _ = self.flush().await;
                }
            }
        }

        info!("Persistence writer stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::record;
    use crate::testkit::store::{FlakyStore, MemoryStore};

    fn settings(threshold: usize) -> WriterSettings {
        WriterSettings {
            flush_threshold: threshold,
            flush_interval: Duration::from_secs(3600),
            max_attempts: 3,
            retry_delay: Duration::from_millis(5),
        }
    }

    #[tokio::test]
    async fn size_trigger_writes_sealed_batch_then_remainder() {
        let store = Arc::new(MemoryStore::new());
        let writer = PersistenceWriter::new(store.clone(), settings(100));

        let sealed = (1..=150).filter(|i| writer.enqueue(record(*i))).count();
        assert_eq!(sealed, 1);

        let report = writer.flush_sealed().await.unwrap();
        assert_eq!(report.records, 100);
        assert_eq!(writer.pending(), 50);

        let report = writer.flush().await.unwrap();
        assert_eq!(report.records, 50);
        assert_eq!(store.batch_sizes(), vec![100, 50]);
        assert_eq!(store.get_all().unwrap().len(), 150);
        assert_eq!(writer.status().flushed_records, 150);
    }

    #[tokio::test]
    async fn empty_flush_touches_nothing() {
        let store = Arc::new(MemoryStore::new());
        let writer = PersistenceWriter::new(store.clone(), settings(10));

        assert_eq!(writer.flush().await.unwrap(), FlushReport::default());
        assert_eq!(store.commits(), 0);
    }

    #[tokio::test]
    async fn transient_failure_is_retried() {
        let store = Arc::new(FlakyStore::new(2));
        let writer = PersistenceWriter::new(store.clone(), settings(10));
        writer.enqueue(record(1));

        let report = writer.flush().await.unwrap();
        assert_eq!(report.attempts, 3);
        assert_eq!(store.attempts(), 3);
        assert!(!writer.status().degraded);
        assert_eq!(store.inner().commits(), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_degrade_then_recover() {
        let store = Arc::new(FlakyStore::new(3));
        let writer = PersistenceWriter::new(store.clone(), settings(10));
        writer.enqueue(record(1));
        writer.enqueue(record(2));

        let err = writer.flush().await.unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::RetriesExhausted {
                records: 2,
                attempts: 3,
                ..
            }
        ));
        let status = writer.status();
        assert!(status.degraded);
        assert_eq!(status.lost_records, 2);
        assert!(status.last_error.is_some());
        assert_eq!(writer.pending(), 0);

        writer.enqueue(record(3));
        writer.flush().await.unwrap();
        let status = writer.status();
        assert!(!status.degraded);
        assert_eq!(status.lost_records, 2);
        assert_eq!(store.get_all().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn coalesced_updates_commit_once() {
        let store = Arc::new(MemoryStore::new());
        let writer = PersistenceWriter::new(store.clone(), settings(100));
        for count in 1..=5 {
            let mut snapshot = record(42);
            snapshot.update_count = count;
            writer.enqueue(snapshot);
        }

        writer.flush().await.unwrap();
        assert_eq!(store.batch_sizes(), vec![1]);
        assert_eq!(store.get(record(42).id).unwrap().unwrap().update_count, 5);
    }

    #[tokio::test]
    async fn run_flushes_sealed_batches_on_request() {
        let store = Arc::new(MemoryStore::new());
        let writer = Arc::new(PersistenceWriter::new(store.clone(), settings(2)));
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(Arc::clone(&writer).run(stop_rx));

        writer.enqueue(record(1));
        assert!(writer.enqueue(record(2)));
        writer.request_flush(FlushTrigger::Size);

        for _ in 0..100 {
            if store.commits() == 1 {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(store.batch_sizes(), vec![2]);

        stop_tx.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn run_flushes_on_interval() {
        let store = Arc::new(MemoryStore::new());
        let writer = Arc::new(PersistenceWriter::new(
            store.clone(),
            WriterSettings {
                flush_interval: Duration::from_millis(50),
                ..settings(100)
            },
        ));
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(Arc::clone(&writer).run(stop_rx));

        writer.enqueue(record(7));
        for _ in 0..100 {
            if store.commits() > 0 {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(store.get_all().unwrap().len(), 1);
        assert_eq!(writer.pending(), 0);

        stop_tx.send(true).unwrap();
        task.await.unwrap();
    }
}
