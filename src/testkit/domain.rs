//! Builders for domain values used across tests.
//!
//! Timestamps are fixed so snapshots compare equal across runs.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

use crate::domain::{
    id::VesselId,
    nav_status::NavigationalStatus,
    update::{PositionUpdate, StaticDataUpdate, VesselUpdate},
    vessel::VesselRecord,
};

/// Fixed reference instant plus `secs`.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(secs)
}

/// A valid [`VesselId`]. Panics on zero.
pub fn vessel_id(raw: u32) -> VesselId {
    VesselId::new(raw).unwrap()
}

/// A position report for `raw` at `(lat, lon)` with plausible kinematics.
pub fn position_at(raw: u32, lat: f64, lon: f64) -> VesselUpdate {
    VesselUpdate::Position(PositionUpdate {
        vessel_id: vessel_id(raw),
        latitude: lat,
        longitude: lon,
        speed: Some(12.5),
        course: Some(87.0),
        heading: Some(88),
        rate_of_turn: None,
        nav_status: Some(NavigationalStatus::UnderWayUsingEngine),
        position_accuracy: Some(true),
        received_at: at(0),
    })
}

/// A static-data update carrying only a name.
pub fn static_named(raw: u32, name: &str) -> VesselUpdate {
    let mut data = StaticDataUpdate::empty(vessel_id(raw), at(0));
    data.name = Some(name.to_string());
    VesselUpdate::StaticData(data)
}

/// A record for `raw` with one position applied.
pub fn record(raw: u32) -> VesselRecord {
    VesselRecord::from_update(&position_at(raw, 10.0, 20.0))
}

/// A fully populated record, for storage tests that compare every column.
pub fn full_record(raw: u32) -> VesselRecord {
    let mut data = StaticDataUpdate::empty(vessel_id(raw), at(5));
    data.imo = Some(9_321_483);
    data.call_sign = Some("9V1234".to_string());
    data.name = Some("EXAMPLE TANKER".to_string());
    data.ship_type = Some(80);
    data.length = Some(250.0);
    data.width = Some(44.0);
    data.draught = Some(14.5);
    data.destination = Some("ROTTERDAM".to_string());
    data.eta = crate::domain::update::Eta::new(3, 14, 6, 0);

    let mut record = VesselRecord::from_update(&position_at(raw, 51.9, 4.1));
    record.apply(&VesselUpdate::StaticData(data));
    record.dimension_to_bow = Some(200);
    record.dimension_to_stern = Some(50);
    record.dimension_to_port = Some(20);
    record.dimension_to_starboard = Some(24);
    record.rate_of_turn = Some(-2.5);
    record.cargo = Some("CRUDE".to_string());
    record.deadweight = Some(115_000);
    record.gross_tonnage = Some(62_000);
    record
}

/// A `PositionReport` frame as the feed sends it.
pub fn position_frame(raw: u32, lat: f64, lon: f64) -> String {
    json!({
        "MessageType": "PositionReport",
        "MetaData": { "MMSI": raw },
        "Message": {
            "PositionReport": {
                "UserID": raw,
                "Latitude": lat,
                "Longitude": lon,
                "Sog": 11.2,
                "Cog": 181.5,
                "TrueHeading": 180,
                "NavigationalStatus": 0,
                "PositionAccuracy": true
            }
        }
    })
    .to_string()
}

/// A `ShipStaticData` frame as the feed sends it.
pub fn static_frame(raw: u32, name: &str, ship_type: u8) -> String {
    json!({
        "MessageType": "ShipStaticData",
        "MetaData": { "MMSI": raw },
        "Message": {
            "ShipStaticData": {
                "UserID": raw,
                "ImoNumber": 9_321_483,
                "CallSign": "9V1234 ",
                "Name": format!("{name}@@@"),
                "Type": ship_type,
                "Dimension": { "A": 200, "B": 50, "C": 20, "D": 24 },
                "MaximumStaticDraught": 14.5,
                "Destination": "ROTTERDAM",
                "Eta": { "Month": 3, "Day": 14, "Hour": 6, "Minute": 0 }
            }
        }
    })
    .to_string()
}
