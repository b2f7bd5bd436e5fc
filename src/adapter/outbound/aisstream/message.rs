//! aisstream.io message types and decoding.
//!
//! Every frame is a JSON object with a `MessageType` tag and the payload
//! nested under `Message.<MessageType>`:
//!
//! ```json
//! {"MessageType":"PositionReport","MetaData":{"MMSI":244660000},
//!  "Message":{"PositionReport":{"UserID":244660000,"Latitude":51.9,"Longitude":4.1}}}
//! ```
//!
//! Decoding produces a [`FeedMessage`]; raw JSON never leaves this module.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::error::DomainError;
use crate::domain::id::VesselId;
use crate::domain::nav_status::NavigationalStatus;
use crate::domain::update::{Dimensions, Eta, FeedMessage, PositionUpdate, StaticDataUpdate};
use crate::port::outbound::feed::{DecodeError, FrameDecoder};

const POSITION_REPORT: &str = "PositionReport";
const SHIP_STATIC_DATA: &str = "ShipStaticData";

/// AIS "not available" sentinels.
const SOG_NOT_AVAILABLE: f64 = 102.3;
const COG_NOT_AVAILABLE: f64 = 360.0;
const HEADING_NOT_AVAILABLE: u16 = 511;
const ROT_NOT_AVAILABLE: f64 = -128.0;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "MessageType")]
    message_type: Option<String>,
    #[serde(rename = "Message", default)]
    message: Option<Payload>,
}

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(rename = "PositionReport")]
    position_report: Option<PositionReportDto>,
    #[serde(rename = "ShipStaticData")]
    ship_static_data: Option<ShipStaticDataDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PositionReportDto {
    #[serde(rename = "UserID")]
    user_id: Option<u64>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    sog: Option<f64>,
    cog: Option<f64>,
    true_heading: Option<u16>,
    rate_of_turn: Option<f64>,
    navigational_status: Option<u8>,
    position_accuracy: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ShipStaticDataDto {
    #[serde(rename = "UserID")]
    user_id: Option<u64>,
    imo_number: Option<u32>,
    call_sign: Option<String>,
    name: Option<String>,
    #[serde(rename = "Type")]
    ship_type: Option<u8>,
    dimension: Option<DimensionDto>,
    maximum_static_draught: Option<f64>,
    destination: Option<String>,
    eta: Option<EtaDto>,
}

#[derive(Debug, Deserialize)]
struct DimensionDto {
    #[serde(rename = "A", default)]
    a: u16,
    #[serde(rename = "B", default)]
    b: u16,
    #[serde(rename = "C", default)]
    c: u16,
    #[serde(rename = "D", default)]
    d: u16,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EtaDto {
    #[serde(default)]
    month: u8,
    #[serde(default)]
    day: u8,
    #[serde(default)]
    hour: u8,
    #[serde(default)]
    minute: u8,
}

/// Decode one text frame.
///
/// # Errors
/// Returns a [`DecodeError`] for unparseable JSON, a missing or invalid
/// vessel identifier, or coordinates outside the valid range.
pub fn decode(text: &str, received_at: DateTime<Utc>) -> Result<FeedMessage, DecodeError> {
    let envelope: Envelope =
        serde_json::from_str(text).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    let message_type = envelope
        .message_type
        .ok_or(DecodeError::MissingField("MessageType"))?;

    match message_type.as_str() {
        POSITION_REPORT => {
            let dto = envelope
                .message
                .and_then(|m| m.position_report)
                .ok_or(DecodeError::MissingField("Message.PositionReport"))?;
            dto.into_update(received_at).map(FeedMessage::Position)
        }
        SHIP_STATIC_DATA => {
            let dto = envelope
                .message
                .and_then(|m| m.ship_static_data)
                .ok_or(DecodeError::MissingField("Message.ShipStaticData"))?;
            dto.into_update(received_at).map(FeedMessage::StaticData)
        }
        _ => Ok(FeedMessage::Unknown { message_type }),
    }
}

/// [`FrameDecoder`] for aisstream.io frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct AisStreamDecoder;

impl FrameDecoder for AisStreamDecoder {
    fn decode(&self, text: &str, received_at: DateTime<Utc>) -> Result<FeedMessage, DecodeError> {
        decode(text, received_at)
    }
}

fn vessel_id(raw: Option<u64>) -> Result<VesselId, DecodeError> {
    let raw = raw.ok_or(DecodeError::MissingField("UserID"))?;
    Ok(VesselId::try_from(raw)?)
}

impl PositionReportDto {
    fn into_update(self, received_at: DateTime<Utc>) -> Result<PositionUpdate, DecodeError> {
        let vessel_id = vessel_id(self.user_id)?;
        let latitude = self.latitude.ok_or(DecodeError::MissingField("Latitude"))?;
        let longitude = self
            .longitude
            .ok_or(DecodeError::MissingField("Longitude"))?;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::CoordinateOutOfRange {
                latitude,
                longitude,
            }
            .into());
        }

        Ok(PositionUpdate {
            vessel_id,
            latitude,
            longitude,
            speed: self.sog.filter(|v| (0.0..SOG_NOT_AVAILABLE).contains(v)),
            course: self.cog.filter(|v| (0.0..COG_NOT_AVAILABLE).contains(v)),
            heading: self.true_heading.filter(|h| *h < 360 && *h != HEADING_NOT_AVAILABLE),
            rate_of_turn: self.rate_of_turn.filter(|r| *r != ROT_NOT_AVAILABLE),
            nav_status: self
                .navigational_status
                .and_then(NavigationalStatus::from_code),
            position_accuracy: self.position_accuracy,
            received_at,
        })
    }
}

impl ShipStaticDataDto {
    fn into_update(self, received_at: DateTime<Utc>) -> Result<StaticDataUpdate, DecodeError> {
        let mut update = StaticDataUpdate::empty(vessel_id(self.user_id)?, received_at);

        update.imo = self.imo_number.filter(|imo| *imo != 0);
        update.call_sign = self.call_sign;
        update.name = self.name;
        update.ship_type = self.ship_type.filter(|code| *code != 0);
        update.destination = self.destination;
        update.draught = self.maximum_static_draught.filter(|d| *d > 0.0);
        update.eta = self
            .eta
            .and_then(|eta| Eta::new(eta.month, eta.day, eta.hour, eta.minute));

        if let Some(dim) = self.dimension {
            let dims = Dimensions {
                to_bow: dim.a,
                to_stern: dim.b,
                to_port: dim.c,
                to_starboard: dim.d,
            };
            if dims.is_known() {
                update.length = Some(dims.length());
                update.width = Some(dims.width());
                update.dimensions = Some(dims);
            }
        }

        Ok(update)
    }
}
