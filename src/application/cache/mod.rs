//! Runtime caches used by the ingestion path and read collaborators.
//!
//! - [`vessel::VesselCache`]: authoritative vessel records
//! - [`region::RegionCache`]: per-region member sets

pub mod region;
pub mod vessel;

pub use region::{MembershipChange, RegionCache};
pub use vessel::VesselCache;
