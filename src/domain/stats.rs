//! Cache statistics snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Ship type code used for vessels whose type is not yet known.
pub const UNKNOWN_SHIP_TYPE: u8 = 0;

/// Point-in-time summary of the vessel cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VesselStatistics {
    /// Number of tracked vessels.
    pub total: usize,
    /// Vessel count per ship type code; untyped vessels count under
    /// [`UNKNOWN_SHIP_TYPE`].
    pub by_type: BTreeMap<u8, usize>,
    /// Most recent update across all vessels.
    pub last_update: Option<DateTime<Utc>>,
}

impl VesselStatistics {
    /// Fold one record's type and timestamp into the snapshot.
    pub fn record(&mut self, ship_type: Option<u8>, last_update: DateTime<Utc>) {
        self.total += 1;
        *self
            .by_type
            .entry(ship_type.unwrap_or(UNKNOWN_SHIP_TYPE))
            .or_default() += 1;
        self.last_update = Some(self.last_update.map_or(last_update, |t| t.max(last_update)));
    }

    /// Vessels with type codes in the tanker range.
    #[must_use]
    pub fn tankers(&self) -> usize {
        self.by_type.range(80..=89).map(|(_, n)| n).sum()
    }

    /// Vessels with type codes in the cargo range.
    #[must_use]
    pub fn cargo(&self) -> usize {
        self.by_type.range(70..=79).map(|(_, n)| n).sum()
    }
}

/// Point-in-time summary of the region cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegionStatistics {
    /// Vessels with at least one known region membership.
    pub vessels_cached: usize,
    /// Sum of per-region member counts.
    pub region_entries: usize,
    pub per_region: BTreeMap<String, usize>,
}
