//! Incremental region membership.
//!
//! Membership is re-evaluated only for the vessel that moved, so an update
//! costs one containment test per region. Member sets are copy-on-write:
//! a region read hands out a shared snapshot without copying it.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::domain::{id::VesselId, region::Region, stats::RegionStatistics};

struct RegionSlot {
    region: Region,
    members: RwLock<Arc<HashSet<VesselId>>>,
}

impl RegionSlot {
    fn insert(&self, id: VesselId) {
        Arc::make_mut(&mut *self.members.write()).insert(id);
    }

    fn remove(&self, id: VesselId) {
        Arc::make_mut(&mut *self.members.write()).remove(&id);
    }
}

/// Regions a vessel entered and left in one update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipChange {
    pub entered: Vec<String>,
    pub left: Vec<String>,
}

impl MembershipChange {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.left.is_empty()
    }
}

/// Per-region member sets over a fixed region table.
pub struct RegionCache {
    slots: Vec<RegionSlot>,
    by_name: HashMap<String, usize>,
    /// Current region indices per vessel, in table order.
    memberships: DashMap<VesselId, Vec<usize>>,
}

impl RegionCache {
    #[must_use]
    pub fn new(regions: Vec<Region>) -> Self {
        let by_name = regions
            .iter()
            .enumerate()
            .map(|(i, r)| (r.name.clone(), i))
            .collect();
        let slots = regions
            .into_iter()
            .map(|region| RegionSlot {
                region,
                members: RwLock::new(Arc::new(HashSet::new())),
            })
            .collect();
        Self {
            slots,
            by_name,
            memberships: DashMap::new(),
        }
    }

    /// Re-evaluate `id` at `(latitude, longitude)` against every region.
    ///
    /// Callers must serialize updates for the same id.
    pub fn update(&self, id: VesselId, latitude: f64, longitude: f64) -> MembershipChange {
        let current: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.region.contains(latitude, longitude))
            .map(|(i, _)| i)
            .collect();

        let mut previous = self.memberships.entry(id).or_default();
        let mut change = MembershipChange::default();

        for &i in previous.iter().filter(|i| !current.contains(*i)) {
            self.slots[i].remove(id);
            change.left.push(self.slots[i].region.name.clone());
        }
        for &i in current.iter().filter(|i| !previous.contains(*i)) {
            self.slots[i].insert(id);
            change.entered.push(self.slots[i].region.name.clone());
        }

        *previous = current;
        change
    }

    /// Members of `region`, or `None` for an unknown region name.
    ///
    /// The snapshot is shared, not copied; later updates do not change it.
    #[must_use]
    pub fn members_of(&self, region: &str) -> Option<Arc<HashSet<VesselId>>> {
        let slot = &self.slots[*self.by_name.get(region)?];
        Some(Arc::clone(&*slot.members.read()))
    }

    /// Member count of `region`.
    #[must_use]
    pub fn count(&self, region: &str) -> Option<usize> {
        let slot = &self.slots[*self.by_name.get(region)?];
        Some(slot.members.read().len())
    }

    #[must_use]
    pub fn contains(&self, region: &str, id: VesselId) -> bool {
        self.by_name
            .get(region)
            .is_some_and(|&i| self.slots[i].members.read().contains(&id))
    }

    /// Names of the regions `id` is currently in.
    #[must_use]
    pub fn regions_of(&self, id: VesselId) -> Vec<String> {
        self.memberships
            .get(&id)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| self.slots[i].region.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drop `id` from every region.
    pub fn remove(&self, id: VesselId) -> bool {
        let Some((_, indices)) = self.memberships.remove(&id) else {
            return false;
        };
        for i in indices {
            self.slots[i].remove(id);
        }
        true
    }

    #[must_use]
    pub fn regions(&self) -> Vec<&Region> {
        self.slots.iter().map(|slot| &slot.region).collect()
    }

    #[must_use]
    pub fn statistics(&self) -> RegionStatistics {
        let per_region: BTreeMap<String, usize> = self
            .slots
            .iter()
            .map(|slot| (slot.region.name.clone(), slot.members.read().len()))
            .collect();
        RegionStatistics {
            vessels_cached: self.memberships.iter().filter(|m| !m.is_empty()).count(),
            region_entries: per_region.values().sum(),
            per_region,
        }
    }
}
