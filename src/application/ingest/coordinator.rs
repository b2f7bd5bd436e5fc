//! Applies decoded updates to the caches and queues them for persistence.

use std::sync::Arc;

use tracing::{debug, trace};

use super::counters::IngestCounters;
use crate::application::cache::{RegionCache, VesselCache};
use crate::application::persistence::{FlushTrigger, PersistenceWriter};
use crate::domain::update::VesselUpdate;

/// Result of one [`Coordinator::process_batch`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub applied: usize,
    /// New vessels turned away by the tracking cap.
    pub rejected: usize,
    pub flush: Option<FlushTrigger>,
}

/// Fan-in point for every accepted update.
///
/// For each update, in order: the vessel cache entry is mutated, region
/// membership is re-evaluated when the update carries a position, and the
/// resulting snapshot is queued for persistence. All three steps run under
/// the vessel's entry lock, so a later update for the same vessel can never
/// overtake an earlier one.
pub struct Coordinator {
    vessels: Arc<VesselCache>,
    regions: Arc<RegionCache>,
    writer: Arc<PersistenceWriter>,
    counters: Arc<IngestCounters>,
}

impl Coordinator {
    #[must_use]
    pub fn new(
        vessels: Arc<VesselCache>,
        regions: Arc<RegionCache>,
        writer: Arc<PersistenceWriter>,
        counters: Arc<IngestCounters>,
    ) -> Self {
        Self {
            vessels,
            regions,
            writer,
            counters,
        }
    }

    #[must_use]
    pub fn vessels(&self) -> &Arc<VesselCache> {
        &self.vessels
    }

    #[must_use]
    pub fn regions(&self) -> &Arc<RegionCache> {
        &self.regions
    }

    #[must_use]
    pub fn writer(&self) -> &Arc<PersistenceWriter> {
        &self.writer
    }

    #[must_use]
    pub fn counters(&self) -> &Arc<IngestCounters> {
        &self.counters
    }

    /// Apply one update. Returns `None` when the tracking cap rejected it.
    pub fn apply(&self, update: &VesselUpdate) -> Option<bool> {
        self.vessels.apply_with(update, |record| {
            if let Some((lat, lon)) = update.position() {
                let change = self.regions.update(record.id, lat, lon);
                if !change.is_empty() {
                    trace!(
                        vessel = %record.id,
                        entered = ?change.entered,
                        left = ?change.left,
                        "Region membership changed"
                    );
                }
            }
            self.writer.enqueue(record.clone())
        })
    }

    /// Apply a batch in order, then ask for a flush if one is due.
    pub fn process_batch(&self, updates: &[VesselUpdate]) -> BatchReport {
        let mut report = BatchReport::default();
        let mut sealed = false;

        for update in updates {
            match self.apply(update) {
                Some(did_seal) => {
                    report.applied += 1;
                    sealed |= did_seal;
                }
                None => {
                    report.rejected += 1;
                    debug!(vessel = %update.vessel_id(), "Tracking cap reached, update dropped");
                }
            }
        }

        self.counters.batch();
        self.counters.add_accepted(report.applied as u64);
        self.counters.add_rejected_capacity(report.rejected as u64);

        report.flush = if sealed || self.writer.has_sealed() {
            Some(FlushTrigger::Size)
        } else if self.writer.flush_due() {
            Some(FlushTrigger::Time)
        } else {
            None
        };
        if let Some(trigger) = report.flush {
            self.writer.request_flush(trigger);
        }

        report
    }
}
