//! Domain validation errors for core domain types.
//!
//! These errors are returned by `try_new`-style constructors when a value
//! coming off the wire violates a domain invariant.
//!
//! # Examples
//!
//! ```
//! use vesselwatch::domain::error::DomainError;
//! use vesselwatch::domain::id::VesselId;
//!
//! assert!(matches!(
//!     VesselId::try_from(0_u64),
//!     Err(DomainError::InvalidVesselId { raw: 0 })
//! ));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Vessel identifiers are MMSI numbers in `1..=999_999_999`.
    #[error("invalid vessel identifier {raw}")]
    InvalidVesselId {
        /// The raw identifier that was rejected.
        raw: u64,
    },

    /// Latitude must be within [-90, 90] and longitude within [-180, 180].
    #[error("coordinate out of range: lat {latitude}, lon {longitude}")]
    CoordinateOutOfRange {
        /// The rejected latitude.
        latitude: f64,
        /// The rejected longitude.
        longitude: f64,
    },

    /// A region's south edge must not exceed its north edge (same for west/east).
    #[error("invalid bounds for region '{name}': {reason}")]
    InvalidRegionBounds {
        /// Region name.
        name: String,
        /// Which constraint was violated.
        reason: String,
    },
}
