//! Pending-write buffer with per-vessel coalescing.

use std::collections::{HashMap, VecDeque};

use crate::domain::{id::VesselId, vessel::VesselRecord};

/// Records waiting for a durable write.
///
/// Pending records are coalesced by id: a newer snapshot replaces the older
/// one in place, so queue order is first-enqueue order. Once the pending
/// set reaches the threshold it is sealed into a ready batch and a fresh
/// pending set starts.
#[derive(Debug)]
pub struct WriteBuffer {
    threshold: usize,
    pending: Vec<VesselRecord>,
    index: HashMap<VesselId, usize>,
    sealed: VecDeque<Vec<VesselRecord>>,
}

impl WriteBuffer {
    #[must_use]
    pub fn new(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            threshold,
            pending: Vec::with_capacity(threshold),
            index: HashMap::with_capacity(threshold),
            sealed: VecDeque::new(),
        }
    }

    /// Add a snapshot. Returns `true` when this push sealed a batch.
    pub fn push(&mut self, record: VesselRecord) -> bool {
        match self.index.get(&record.id) {
            Some(&slot) => self.pending[slot] = record,
            None => {
                self.index.insert(record.id, self.pending.len());
                self.pending.push(record);
            }
        }

        if self.pending.len() >= self.threshold {
            self.seal();
            return true;
        }
        false
    }

    fn seal(&mut self) {
        let batch = std::mem::replace(&mut self.pending, Vec::with_capacity(self.threshold));
        self.index.clear();
        self.sealed.push_back(batch);
    }

    /// Remove every sealed batch, oldest first.
    pub fn take_sealed(&mut self) -> Vec<VesselRecord> {
        self.sealed.drain(..).flatten().collect()
    }

    /// Remove everything: sealed batches first, then the pending set.
    pub fn take_all(&mut self) -> Vec<VesselRecord> {
        let mut all = self.take_sealed();
        all.append(&mut self.pending);
        self.index.clear();
        all
    }

    /// Records not yet handed to a flush.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len() + self.sealed.iter().map(Vec::len).sum::<usize>()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn has_sealed(&self) -> bool {
        !self.sealed.is_empty()
    }
}
