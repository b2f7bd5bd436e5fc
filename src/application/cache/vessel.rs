//! Concurrent vessel cache.

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};

use crate::domain::{
    id::VesselId, ship_type::ShipType, stats::VesselStatistics, update::VesselUpdate,
    vessel::VesselRecord,
};

/// Authoritative in-memory view of tracked vessels.
///
/// Backed by a sharded map: updates to one id are serialized by its entry
/// lock while different ids proceed independently. Reads return clones, so
/// callers never hold a lock.
pub struct VesselCache {
    vessels: DashMap<VesselId, VesselRecord>,
    /// Admission cap for new ids; known ids always update.
    max_tracked: Option<usize>,
    /// Admitted ids. Reserved before insert so the cap holds under races.
    tracked: AtomicUsize,
}

impl VesselCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity_limit(None)
    }

    /// Create a cache that rejects new ids once `max_tracked` are tracked.
    #[must_use]
    pub fn with_capacity_limit(max_tracked: Option<usize>) -> Self {
        Self {
            vessels: DashMap::new(),
            max_tracked,
            tracked: AtomicUsize::new(0),
        }
    }

    /// Reserve room for one new id.
    fn admit(&self) -> bool {
        match self.max_tracked {
            Some(cap) => self
                .tracked
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                    (n < cap).then_some(n + 1)
                })
                .is_ok(),
            None => {
                self.tracked.fetch_add(1, Ordering::AcqRel);
                true
            }
        }
    }

    /// Apply `update`, creating the record if needed, then run `then` on the
    /// result while the entry lock is still held.
    ///
    /// Returns `None` without touching the cache when the update is for a
    /// new id and the admission cap is reached.
    pub fn apply_with<R>(
        &self,
        update: &VesselUpdate,
        then: impl FnOnce(&VesselRecord) -> R,
    ) -> Option<R> {
        let id = update.vessel_id();
        let mut entry = match self.vessels.entry(id) {
            Entry::Occupied(slot) => slot.into_ref(),
            Entry::Vacant(slot) => {
                if !self.admit() {
                    return None;
                }
                slot.insert(VesselRecord::new(id, update.received_at()))
            }
        };
        entry.apply(update);
        Some(then(entry.value()))
    }

    /// Apply `update` and return the resulting snapshot.
    pub fn apply(&self, update: &VesselUpdate) -> Option<VesselRecord> {
        self.apply_with(update, VesselRecord::clone)
    }

    /// Load previously persisted records. Existing entries are kept.
    pub fn hydrate(&self, records: impl IntoIterator<Item = VesselRecord>) -> usize {
        let mut loaded = 0;
        for record in records {
            if let Entry::Vacant(slot) = self.vessels.entry(record.id) {
                self.tracked.fetch_add(1, Ordering::AcqRel);
                slot.insert(record);
                loaded += 1;
            }
        }
        loaded
    }

    #[must_use]
    pub fn vessel(&self, id: VesselId) -> Option<VesselRecord> {
        self.vessels.get(&id).map(|r| r.value().clone())
    }

    /// Vessels with a known position.
    #[must_use]
    pub fn active_vessels(&self) -> Vec<VesselRecord> {
        self.vessels
            .iter()
            .filter(|r| r.has_position())
            .map(|r| r.value().clone())
            .collect()
    }

    /// Vessels whose ship type code is one of `codes`.
    #[must_use]
    pub fn vessels_by_type(&self, codes: &[u8]) -> Vec<VesselRecord> {
        self.vessels
            .iter()
            .filter(|r| r.ship_type.is_some_and(|code| codes.contains(&code)))
            .map(|r| r.value().clone())
            .collect()
    }

    /// Tankers with a known position.
    #[must_use]
    pub fn active_tankers(&self) -> Vec<VesselRecord> {
        self.vessels
            .iter()
            .filter(|r| r.has_position() && r.kind().is_some_and(ShipType::is_tanker))
            .map(|r| r.value().clone())
            .collect()
    }

    #[must_use]
    pub fn statistics(&self) -> VesselStatistics {
        let mut stats = VesselStatistics::default();
        for r in &self.vessels {
            stats.record(r.ship_type, r.last_update);
        }
        stats
    }

    /// Most recent update across all vessels.
    #[must_use]
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.vessels.iter().map(|r| r.last_update).max()
    }

    /// Eviction hook for an external capacity policy.
    pub fn remove(&self, id: VesselId) -> Option<VesselRecord> {
        let (_, record) = self.vessels.remove(&id)?;
        self.tracked.fetch_sub(1, Ordering::AcqRel);
        Some(record)
    }

    #[must_use]
    pub fn contains(&self, id: VesselId) -> bool {
        self.vessels.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vessels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vessels.is_empty()
    }
}

impl Default for VesselCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testkit::domain::{position_at, static_named, vessel_id};

    #[test]
    fn repeated_positions_keep_last_kinematics() {
        let cache = VesselCache::new();
        let points = [(1.0, 2.0), (1.5, 2.5), (3.0, -4.0), (-10.0, 100.0)];
        for (lat, lon) in points {
            cache.apply(&position_at(77, lat, lon));
        }

        let record = cache.vessel(vessel_id(77)).unwrap();
        assert_eq!(record.position(), Some((-10.0, 100.0)));
        assert_eq!(record.update_count, points.len() as u64);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn admission_cap_rejects_only_new_ids() {
        let cache = VesselCache::with_capacity_limit(Some(2));
        assert!(cache.apply(&position_at(1, 0.0, 0.0)).is_some());
        assert!(cache.apply(&position_at(2, 0.0, 0.0)).is_some());
        assert!(cache.apply(&position_at(3, 0.0, 0.0)).is_none());
        assert!(cache.apply(&position_at(1, 1.0, 1.0)).is_some());

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(vessel_id(3)));
    }

    #[test]
    fn admission_cap_holds_under_concurrent_new_ids() {
        let cache = Arc::new(VesselCache::with_capacity_limit(Some(50)));
        let handles: Vec<_> = (0..8u32)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    (0..100u32)
                        .filter(|i| {
                            let mmsi = 100_000_000 + t * 1_000 + i;
                            cache.apply(&position_at(mmsi, 0.0, 0.0)).is_some()
                        })
                        .count()
                })
            })
            .collect();
        let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(accepted, 50);
        assert_eq!(cache.len(), 50);
    }

    #[test]
    fn removal_frees_an_admission_slot() {
        let cache = VesselCache::with_capacity_limit(Some(1));
        assert!(cache.apply(&position_at(1, 0.0, 0.0)).is_some());
        assert!(cache.apply(&position_at(2, 0.0, 0.0)).is_none());

        cache.remove(vessel_id(1));
        assert!(cache.apply(&position_at(2, 0.0, 0.0)).is_some());
        assert!(cache.apply(&position_at(3, 0.0, 0.0)).is_none());
    }

    #[test]
    fn queries_filter_by_type_and_position() {
        let cache = VesselCache::new();
        let mut tanker = static_named(10, "TANKER ONE");
        if let VesselUpdate::StaticData(ref mut s) = tanker {
            s.ship_type = Some(81);
        }
        cache.apply(&tanker);
        cache.apply(&position_at(11, 5.0, 5.0));

        assert_eq!(cache.active_vessels().len(), 1);
        assert_eq!(cache.vessels_by_type(&[80, 81]).len(), 1);
        assert!(cache.active_tankers().is_empty());

        cache.apply(&position_at(10, 26.0, 52.0));
        assert_eq!(cache.active_tankers().len(), 1);

        let stats = cache.statistics();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.tankers(), 1);
        assert_eq!(stats.last_update, cache.last_update());
    }

    #[test]
    fn hydrate_does_not_overwrite_live_records() {
        let cache = VesselCache::new();
        let live = cache.apply(&position_at(5, 1.0, 1.0)).unwrap();
        let mut stale = live.clone();
        stale.latitude = Some(50.0);

        let loaded = cache.hydrate(vec![stale, VesselRecord::new(vessel_id(6), live.first_seen)]);
        assert_eq!(loaded, 1);
        assert_eq!(cache.vessel(vessel_id(5)).unwrap().latitude, Some(1.0));
    }

    #[test]
    fn concurrent_updates_to_one_id_are_not_lost() {
        let cache = Arc::new(VesselCache::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..250 {
                        cache.apply(&position_at(42, f64::from(t), f64::from(i)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.vessel(vessel_id(42)).unwrap().update_count, 2_000);
    }

    #[test]
    fn remove_evicts() {
        let cache = VesselCache::new();
        cache.apply(&position_at(9, 0.0, 0.0));
        assert!(cache.remove(vessel_id(9)).is_some());
        assert!(cache.is_empty());
    }
}
