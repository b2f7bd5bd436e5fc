//! Decoded feed messages.
//!
//! Raw payloads are decoded into this closed set of variants at the adapter
//! boundary; nothing past the decoder ever sees untyped JSON.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::VesselId;
use super::nav_status::NavigationalStatus;

/// Live kinematic report for one vessel.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionUpdate {
    pub vessel_id: VesselId,
    pub latitude: f64,
    pub longitude: f64,
    /// Speed over ground in knots.
    pub speed: Option<f64>,
    /// Course over ground in degrees.
    pub course: Option<f64>,
    /// True heading in degrees; the AIS "not available" value is decoded as `None`.
    pub heading: Option<u16>,
    pub rate_of_turn: Option<f64>,
    pub nav_status: Option<NavigationalStatus>,
    pub position_accuracy: Option<bool>,
    pub received_at: DateTime<Utc>,
}

/// Reference point offsets from the AIS antenna, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub to_bow: u16,
    pub to_stern: u16,
    pub to_port: u16,
    pub to_starboard: u16,
}

impl Dimensions {
    #[must_use]
    pub fn length(&self) -> f64 {
        f64::from(self.to_bow) + f64::from(self.to_stern)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        f64::from(self.to_port) + f64::from(self.to_starboard)
    }

    /// All-zero offsets mean "not available".
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.length() > 0.0 && self.width() > 0.0
    }
}

/// Estimated time of arrival as broadcast (no year, UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eta {
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

impl Eta {
    /// `None` when any component is the AIS "not available" value.
    #[must_use]
    pub fn new(month: u8, day: u8, hour: u8, minute: u8) -> Option<Self> {
        let valid = (1..=12).contains(&month) && (1..=31).contains(&day) && hour < 24 && minute < 60;
        valid.then_some(Self {
            month,
            day,
            hour,
            minute,
        })
    }
}

impl fmt::Display for Eta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}-{:02} {:02}:{:02}",
            self.month, self.day, self.hour, self.minute
        )
    }
}

impl FromStr for Eta {
    type Err = String;

    /// Parse the `MM-DD HH:MM` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid ETA '{s}'");
        let (date, time) = s.trim().split_once(' ').ok_or_else(invalid)?;
        let (month, day) = date.split_once('-').ok_or_else(invalid)?;
        let (hour, minute) = time.split_once(':').ok_or_else(invalid)?;
        let part = |v: &str| v.parse::<u8>().map_err(|_| invalid());
        Self::new(part(month)?, part(day)?, part(hour)?, part(minute)?).ok_or_else(invalid)
    }
}

/// Static and voyage enrichment for one vessel.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticDataUpdate {
    pub vessel_id: VesselId,
    pub imo: Option<u32>,
    pub call_sign: Option<String>,
    pub name: Option<String>,
    pub ship_type: Option<u8>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub draught: Option<f64>,
    pub dimensions: Option<Dimensions>,
    pub destination: Option<String>,
    pub eta: Option<Eta>,
    pub cargo: Option<String>,
    pub deadweight: Option<u32>,
    pub gross_tonnage: Option<u32>,
    pub received_at: DateTime<Utc>,
}

impl StaticDataUpdate {
    /// An update carrying no fields yet; decoders fill in what the message has.
    #[must_use]
    pub fn empty(vessel_id: VesselId, received_at: DateTime<Utc>) -> Self {
        Self {
            vessel_id,
            imo: None,
            call_sign: None,
            name: None,
            ship_type: None,
            length: None,
            width: None,
            draught: None,
            dimensions: None,
            destination: None,
            eta: None,
            cargo: None,
            deadweight: None,
            gross_tonnage: None,
            received_at,
        }
    }
}

/// An accepted update for a single vessel.
#[derive(Debug, Clone, PartialEq)]
pub enum VesselUpdate {
    Position(PositionUpdate),
    StaticData(StaticDataUpdate),
}

impl VesselUpdate {
    #[must_use]
    pub fn vessel_id(&self) -> VesselId {
        match self {
            Self::Position(p) => p.vessel_id,
            Self::StaticData(s) => s.vessel_id,
        }
    }

    #[must_use]
    pub fn received_at(&self) -> DateTime<Utc> {
        match self {
            Self::Position(p) => p.received_at,
            Self::StaticData(s) => s.received_at,
        }
    }

    /// `(lat, lon)` when this update moves the vessel.
    #[must_use]
    pub fn position(&self) -> Option<(f64, f64)> {
        match self {
            Self::Position(p) => Some((p.latitude, p.longitude)),
            Self::StaticData(_) => None,
        }
    }

    /// Short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Position(_) => "position",
            Self::StaticData(_) => "static",
        }
    }
}

/// A fully decoded feed message.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    Position(PositionUpdate),
    StaticData(StaticDataUpdate),
    /// A well-formed message of a type this pipeline does not track.
    Unknown { message_type: String },
}

impl FeedMessage {
    /// Convert into a vessel update, discarding unknown messages.
    #[must_use]
    pub fn into_update(self) -> Option<VesselUpdate> {
        match self {
            Self::Position(p) => Some(VesselUpdate::Position(p)),
            Self::StaticData(s) => Some(VesselUpdate::StaticData(s)),
            Self::Unknown { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eta_rejects_not_available_markers() {
        assert!(Eta::new(0, 0, 24, 60).is_none());
        assert!(Eta::new(13, 1, 0, 0).is_none());
        let eta = Eta::new(3, 14, 6, 5).unwrap();
        assert_eq!(eta.to_string(), "03-14 06:05");
        assert_eq!("03-14 06:05".parse::<Eta>(), Ok(eta));
        assert!("3/14 6:05".parse::<Eta>().is_err());
    }

    #[test]
    fn dimensions_derive_length_and_width() {
        let dims = Dimensions {
            to_bow: 200,
            to_stern: 50,
            to_port: 20,
            to_starboard: 24,
        };
        assert_eq!(dims.length(), 250.0);
        assert_eq!(dims.width(), 44.0);
        assert!(dims.is_known());
        assert!(!Dimensions {
            to_bow: 0,
            to_stern: 0,
            to_port: 0,
            to_starboard: 0
        }
        .is_known());
    }
}
