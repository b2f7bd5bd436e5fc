//! In-memory [`VesselStore`] implementations.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;

use crate::domain::{id::VesselId, vessel::VesselRecord};
use crate::error::{Error, Result};
use crate::port::outbound::store::VesselStore;

/// Map-backed store that records every committed batch.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<VesselId, VesselRecord>>,
    batches: Mutex<Vec<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sizes of every committed batch, in commit order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().clone()
    }

    /// Number of committed transactions.
    pub fn commits(&self) -> usize {
        self.batches.lock().len()
    }
}

impl VesselStore for MemoryStore {
    fn save_batch(&self, records: &[VesselRecord]) -> Result<usize> {
        let mut stored = self.records.lock();
        for record in records {
            stored.insert(record.id, record.clone());
        }
        self.batches.lock().push(records.len());
        Ok(records.len())
    }

    fn get(&self, id: VesselId) -> Result<Option<VesselRecord>> {
        Ok(self.records.lock().get(&id).cloned())
    }

    fn get_all(&self) -> Result<Vec<VesselRecord>> {
        Ok(self.records.lock().values().cloned().collect())
    }
}

/// Store that fails the first `failures` writes, then behaves like
/// [`MemoryStore`].
pub struct FlakyStore {
    inner: MemoryStore,
    remaining_failures: AtomicU32,
    attempts: AtomicU32,
}

impl FlakyStore {
    pub fn new(failures: u32) -> Self {
        Self {
            inner: MemoryStore::new(),
            remaining_failures: AtomicU32::new(failures),
            attempts: AtomicU32::new(0),
        }
    }

    /// Always fail.
    pub fn broken() -> Self {
        Self::new(u32::MAX)
    }

    /// Every `save_batch` call, failed or not.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl VesselStore for FlakyStore {
    fn save_batch(&self, records: &[VesselRecord]) -> Result<usize> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::Database("database is locked".into()));
        }
        self.inner.save_batch(records)
    }

    fn get(&self, id: VesselId) -> Result<Option<VesselRecord>> {
        self.inner.get(id)
    }

    fn get_all(&self) -> Result<Vec<VesselRecord>> {
        self.inner.get_all()
    }
}
