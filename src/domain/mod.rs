//! Vessel domain types.
//!
//! Everything here is pure data and update rules; no I/O, no locking.

pub mod error;
pub mod id;
pub mod nav_status;
pub mod region;
pub mod ship_type;
pub mod stats;
pub mod update;
pub mod vessel;

pub use error::DomainError;
pub use id::VesselId;
pub use nav_status::NavigationalStatus;
pub use region::{default_regions, BoundingBox, Region};
pub use ship_type::{ShipType, TankerClass};
pub use stats::{RegionStatistics, VesselStatistics};
pub use update::{Dimensions, Eta, FeedMessage, PositionUpdate, StaticDataUpdate, VesselUpdate};
pub use vessel::VesselRecord;
