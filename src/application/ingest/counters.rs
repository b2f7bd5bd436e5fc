//! Ingest counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Lock-free counters updated by the batch consumer.
#[derive(Debug, Default)]
pub struct IngestCounters {
    decoded: AtomicU64,
    malformed: AtomicU64,
    unknown: AtomicU64,
    accepted: AtomicU64,
    rejected_capacity: AtomicU64,
    batches: AtomicU64,
}

/// Point-in-time copy of [`IngestCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestCountersSnapshot {
    pub decoded: u64,
    pub malformed: u64,
    pub unknown: u64,
    pub accepted: u64,
    pub rejected_capacity: u64,
    pub batches: u64,
}

impl IngestCounters {
    pub(crate) fn add_decoded(&self, n: u64) {
        self.decoded.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn add_malformed(&self, n: u64) {
        self.malformed.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn add_unknown(&self, n: u64) {
        self.unknown.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn add_accepted(&self, n: u64) {
        self.accepted.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn add_rejected_capacity(&self, n: u64) {
        self.rejected_capacity.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn batch(&self) {
        self.batches.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> IngestCountersSnapshot {
        IngestCountersSnapshot {
            decoded: self.decoded.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            unknown: self.unknown.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected_capacity: self.rejected_capacity.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
        }
    }
}
