//! The canonical vessel record and its update rules.
//!
//! A record is created on the first accepted update for an identifier and
//! then mutated in place by every later update. Field groups follow
//! different rules:
//!
//! - identity (IMO, call sign, name, ship type) is only ever enriched; an
//!   absent or blank value never clears what is already known,
//! - kinematics are replaced wholesale by each position report,
//! - physical and voyage fields are replaced when an enrichment message
//!   carries them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::VesselId;
use super::nav_status::NavigationalStatus;
use super::ship_type::{ShipType, TankerClass};
use super::update::{Eta, PositionUpdate, StaticDataUpdate, VesselUpdate};

/// Block coefficient used to estimate deadweight from hull dimensions.
const DEADWEIGHT_BLOCK_COEFFICIENT: f64 = 0.75;

/// Authoritative state for one tracked vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselRecord {
    pub id: VesselId,

    // Identity
    pub imo: Option<u32>,
    pub call_sign: Option<String>,
    pub name: Option<String>,
    pub ship_type: Option<u8>,

    // Kinematics
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub speed: Option<f64>,
    pub course: Option<f64>,
    pub heading: Option<u16>,
    pub rate_of_turn: Option<f64>,
    pub nav_status: Option<NavigationalStatus>,
    pub position_accuracy: Option<bool>,

    // Physical
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub draught: Option<f64>,
    pub dimension_to_bow: Option<u16>,
    pub dimension_to_stern: Option<u16>,
    pub dimension_to_port: Option<u16>,
    pub dimension_to_starboard: Option<u16>,

    // Voyage
    pub destination: Option<String>,
    pub eta: Option<Eta>,
    pub cargo: Option<String>,
    pub deadweight: Option<u32>,
    pub gross_tonnage: Option<u32>,

    // Bookkeeping
    pub first_seen: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    pub update_count: u64,
}

impl VesselRecord {
    /// An empty record first seen at `first_seen`, with no updates applied.
    #[must_use]
    pub fn new(id: VesselId, first_seen: DateTime<Utc>) -> Self {
        Self {
            id,
            imo: None,
            call_sign: None,
            name: None,
            ship_type: None,
            latitude: None,
            longitude: None,
            speed: None,
            course: None,
            heading: None,
            rate_of_turn: None,
            nav_status: None,
            position_accuracy: None,
            length: None,
            width: None,
            draught: None,
            dimension_to_bow: None,
            dimension_to_stern: None,
            dimension_to_port: None,
            dimension_to_starboard: None,
            destination: None,
            eta: None,
            cargo: None,
            deadweight: None,
            gross_tonnage: None,
            first_seen,
            last_update: first_seen,
            update_count: 0,
        }
    }

    /// Create a record from its first update.
    #[must_use]
    pub fn from_update(update: &VesselUpdate) -> Self {
        let mut record = Self::new(update.vessel_id(), update.received_at());
        record.apply(update);
        record
    }

    /// Apply one accepted update.
    ///
    /// Updates for a different identifier are ignored and return `false`.
    pub fn apply(&mut self, update: &VesselUpdate) -> bool {
        if update.vessel_id() != self.id {
            return false;
        }

        match update {
            VesselUpdate::Position(position) => self.apply_position(position),
            VesselUpdate::StaticData(data) => self.apply_static(data),
        }

        self.update_count += 1;
        self.last_update = self.last_update.max(update.received_at());
        true
    }

    fn apply_position(&mut self, p: &PositionUpdate) {
        self.latitude = Some(p.latitude);
        self.longitude = Some(p.longitude);
        self.speed = p.speed;
        self.course = p.course;
        self.heading = p.heading;
        self.rate_of_turn = p.rate_of_turn;
        self.nav_status = p.nav_status;
        self.position_accuracy = p.position_accuracy;
    }

    fn apply_static(&mut self, s: &StaticDataUpdate) {
        enrich(&mut self.imo, s.imo.filter(|imo| *imo != 0));
        enrich(&mut self.call_sign, s.call_sign.as_deref().and_then(clean_text));
        enrich(&mut self.name, s.name.as_deref().and_then(clean_text));
        enrich(&mut self.ship_type, s.ship_type.filter(|code| *code != 0));

        if let Some(dims) = s.dimensions {
            self.dimension_to_bow = Some(dims.to_bow);
            self.dimension_to_stern = Some(dims.to_stern);
            self.dimension_to_port = Some(dims.to_port);
            self.dimension_to_starboard = Some(dims.to_starboard);
        }
        overwrite(&mut self.length, s.length);
        overwrite(&mut self.width, s.width);
        overwrite(&mut self.draught, s.draught);

        overwrite(
            &mut self.destination,
            s.destination.as_deref().and_then(clean_text),
        );
        overwrite(&mut self.eta, s.eta);
        overwrite(&mut self.cargo, s.cargo.as_deref().and_then(clean_text));
        overwrite(&mut self.deadweight, s.deadweight);
        overwrite(&mut self.gross_tonnage, s.gross_tonnage);
    }

    /// `(lat, lon)` of the last position report, if any.
    #[must_use]
    pub fn position(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    #[must_use]
    pub fn has_position(&self) -> bool {
        self.position().is_some()
    }

    #[must_use]
    pub fn kind(&self) -> Option<ShipType> {
        self.ship_type.map(ShipType::new)
    }

    /// Reported deadweight, or a hull-dimension estimate for cargo vessels
    /// and tankers that do not report one.
    #[must_use]
    pub fn estimated_deadweight(&self) -> Option<f64> {
        if let Some(dwt) = self.deadweight {
            return Some(f64::from(dwt));
        }
        let kind = self.kind()?;
        if !kind.is_cargo() && !kind.is_tanker() {
            return None;
        }
        match (self.length, self.width, self.draught) {
            (Some(l), Some(w), Some(d)) if l > 0.0 && w > 0.0 && d > 0.0 => {
                Some(l * w * d * DEADWEIGHT_BLOCK_COEFFICIENT)
            }
            _ => None,
        }
    }

    /// Size class for tankers with a known or estimated deadweight.
    #[must_use]
    pub fn tanker_class(&self) -> Option<TankerClass> {
        if !self.kind()?.is_tanker() {
            return None;
        }
        self.estimated_deadweight().and_then(TankerClass::classify)
    }

    /// Label for logs and listings: the name when known, otherwise the MMSI.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("MMSI {}", self.id))
    }
}

fn enrich<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
    if let Some(value) = value {
        *slot = Some(value);
    }
}

/// AIS pads text fields with `@`; blank after stripping means "not available".
pub(crate) fn clean_text(raw: &str) -> Option<String> {
    let cleaned = raw.trim().trim_end_matches('@').trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn id(raw: u32) -> VesselId {
        VesselId::new(raw).unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(secs)
    }

    fn position(raw: u32, lat: f64, lon: f64, speed: Option<f64>, secs: i64) -> VesselUpdate {
        VesselUpdate::Position(PositionUpdate {
            vessel_id: id(raw),
            latitude: lat,
            longitude: lon,
            speed,
            course: speed.map(|s| s * 10.0),
            heading: Some(90),
            rate_of_turn: None,
            nav_status: Some(NavigationalStatus::UnderWayUsingEngine),
            position_accuracy: Some(true),
            received_at: at(secs),
        })
    }

    fn named(raw: u32, name: &str, secs: i64) -> VesselUpdate {
        let mut data = StaticDataUpdate::empty(id(raw), at(secs));
        data.name = Some(name.to_string());
        VesselUpdate::StaticData(data)
    }

    #[test]
    fn three_positions_then_static_name() {
        let a = position(42, 10.0, 20.0, Some(5.0), 0);
        let b = position(42, 10.1, 20.1, Some(6.0), 1);
        let c = position(42, 10.2, 20.2, None, 2);
        let mut record = VesselRecord::from_update(&a);
        record.apply(&b);
        record.apply(&c);
        record.apply(&named(42, "EXAMPLE", 3));

        assert_eq!(record.position(), Some((10.2, 20.2)));
        assert_eq!(record.speed, None);
        assert_eq!(record.course, None);
        assert_eq!(record.name.as_deref(), Some("EXAMPLE"));
        assert_eq!(record.update_count, 4);
    }

    #[test]
    fn identity_is_never_cleared() {
        let mut record = VesselRecord::from_update(&named(7, "NORDIC STAR", 0));
        record.apply(&named(7, "   @@@@", 1));

        let mut blank = StaticDataUpdate::empty(id(7), at(2));
        blank.imo = Some(0);
        blank.ship_type = Some(0);
        record.apply(&VesselUpdate::StaticData(blank));

        assert_eq!(record.name.as_deref(), Some("NORDIC STAR"));
        assert_eq!(record.imo, None);
        assert_eq!(record.ship_type, None);
        assert_eq!(record.update_count, 3);
    }

    #[test]
    fn text_padding_is_stripped() {
        let record = VesselRecord::from_update(&named(7, "MAERSK ALABAMA@@@ ", 0));
        assert_eq!(record.name.as_deref(), Some("MAERSK ALABAMA"));
    }

    #[test]
    fn last_update_never_moves_backwards() {
        let mut record = VesselRecord::from_update(&position(9, 1.0, 1.0, None, 10));
        record.apply(&position(9, 2.0, 2.0, None, 5));

        assert_eq!(record.first_seen, at(10));
        assert_eq!(record.last_update, at(10));
        assert!(record.first_seen <= record.last_update);
        assert_eq!(record.position(), Some((2.0, 2.0)));
    }

    #[test]
    fn updates_for_other_ids_are_ignored() {
        let mut record = VesselRecord::from_update(&position(1, 1.0, 1.0, None, 0));
        assert!(!record.apply(&position(2, 5.0, 5.0, None, 1)));
        assert_eq!(record.update_count, 1);
        assert_eq!(record.position(), Some((1.0, 1.0)));
    }

    #[test]
    fn deadweight_estimate_for_tankers() {
        let mut data = StaticDataUpdate::empty(id(3), at(0));
        data.ship_type = Some(80);
        data.length = Some(330.0);
        data.width = Some(60.0);
        data.draught = Some(20.0);
        let record = VesselRecord::from_update(&VesselUpdate::StaticData(data));

        let dwt = record.estimated_deadweight().unwrap();
        assert!((dwt - 297_000.0).abs() < f64::EPSILON);
        assert_eq!(record.tanker_class(), Some(TankerClass::Vlcc));
    }

    #[test]
    fn no_estimate_for_passenger_vessels() {
        let mut data = StaticDataUpdate::empty(id(3), at(0));
        data.ship_type = Some(60);
        data.length = Some(300.0);
        data.width = Some(40.0);
        data.draught = Some(9.0);
        let record = VesselRecord::from_update(&VesselUpdate::StaticData(data));
        assert_eq!(record.estimated_deadweight(), None);
        assert_eq!(record.tanker_class(), None);
    }
}
