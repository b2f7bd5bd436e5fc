//! Database model types for Diesel ORM.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::vessels;
use crate::domain::{id::VesselId, nav_status::NavigationalStatus, vessel::VesselRecord};
use crate::error::{Error, Result};

/// Database row for a vessel snapshot.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = vessels)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct VesselRow {
    pub mmsi: i64,
    pub imo: Option<i64>,
    pub call_sign: Option<String>,
    pub name: Option<String>,
    pub ship_type: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub speed: Option<f64>,
    pub course: Option<f64>,
    pub heading: Option<i32>,
    pub rate_of_turn: Option<f64>,
    pub nav_status: Option<i32>,
    pub position_accuracy: Option<bool>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub draught: Option<f64>,
    pub dimension_to_bow: Option<i32>,
    pub dimension_to_stern: Option<i32>,
    pub dimension_to_port: Option<i32>,
    pub dimension_to_starboard: Option<i32>,
    pub destination: Option<String>,
    pub eta: Option<String>,
    pub cargo: Option<String>,
    pub deadweight: Option<i64>,
    pub gross_tonnage: Option<i64>,
    pub first_seen: String,
    pub last_update: String,
    pub update_count: i64,
}

impl From<&VesselRecord> for VesselRow {
    fn from(r: &VesselRecord) -> Self {
        Self {
            mmsi: i64::from(r.id),
            imo: r.imo.map(i64::from),
            call_sign: r.call_sign.clone(),
            name: r.name.clone(),
            ship_type: r.ship_type.map(i32::from),
            latitude: r.latitude,
            longitude: r.longitude,
            speed: r.speed,
            course: r.course,
            heading: r.heading.map(i32::from),
            rate_of_turn: r.rate_of_turn,
            nav_status: r.nav_status.map(|s| i32::from(s.code())),
            position_accuracy: r.position_accuracy,
            length: r.length,
            width: r.width,
            draught: r.draught,
            dimension_to_bow: r.dimension_to_bow.map(i32::from),
            dimension_to_stern: r.dimension_to_stern.map(i32::from),
            dimension_to_port: r.dimension_to_port.map(i32::from),
            dimension_to_starboard: r.dimension_to_starboard.map(i32::from),
            destination: r.destination.clone(),
            eta: r.eta.map(|eta| eta.to_string()),
            cargo: r.cargo.clone(),
            deadweight: r.deadweight.map(i64::from),
            gross_tonnage: r.gross_tonnage.map(i64::from),
            first_seen: r.first_seen.to_rfc3339(),
            last_update: r.last_update.to_rfc3339(),
            update_count: i64::try_from(r.update_count).unwrap_or(i64::MAX),
        }
    }
}

impl TryFrom<VesselRow> for VesselRecord {
    type Error = Error;

    fn try_from(row: VesselRow) -> Result<Self> {
        Ok(Self {
            id: VesselId::try_from(row.mmsi)?,
            imo: narrow(row.imo, "imo")?,
            call_sign: row.call_sign,
            name: row.name,
            ship_type: narrow(row.ship_type, "ship_type")?,
            latitude: row.latitude,
            longitude: row.longitude,
            speed: row.speed,
            course: row.course,
            heading: narrow(row.heading, "heading")?,
            rate_of_turn: row.rate_of_turn,
            nav_status: narrow::<_, u8>(row.nav_status, "nav_status")?
                .and_then(NavigationalStatus::from_code),
            position_accuracy: row.position_accuracy,
            length: row.length,
            width: row.width,
            draught: row.draught,
            dimension_to_bow: narrow(row.dimension_to_bow, "dimension_to_bow")?,
            dimension_to_stern: narrow(row.dimension_to_stern, "dimension_to_stern")?,
            dimension_to_port: narrow(row.dimension_to_port, "dimension_to_port")?,
            dimension_to_starboard: narrow(row.dimension_to_starboard, "dimension_to_starboard")?,
            destination: row.destination,
            eta: row
                .eta
                .map(|eta| eta.parse().map_err(Error::Parse))
                .transpose()?,
            cargo: row.cargo,
            deadweight: narrow(row.deadweight, "deadweight")?,
            gross_tonnage: narrow(row.gross_tonnage, "gross_tonnage")?,
            first_seen: parse_timestamp(&row.first_seen)?,
            last_update: parse_timestamp(&row.last_update)?,
            update_count: u64::try_from(row.update_count).unwrap_or(0),
        })
    }
}

fn narrow<S, T>(value: Option<S>, column: &str) -> Result<Option<T>>
where
    S: Copy + std::fmt::Display,
    T: TryFrom<S>,
{
    value
        .map(|v| T::try_from(v).map_err(|_| Error::Parse(format!("{column} out of range: {v}"))))
        .transpose()
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Parse(e.to_string()))
}
