//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Vessel identifier (MMSI) - newtype for type safety.
///
/// The inner value is private so every identifier that exists has passed
/// range validation. Records with an invalid identifier never reach a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct VesselId(u32);

impl VesselId {
    /// Largest MMSI that can be assigned (nine decimal digits).
    pub const MAX: u32 = 999_999_999;

    /// Create a `VesselId`, returning `None` for zero or out-of-range values.
    #[must_use]
    pub const fn new(raw: u32) -> Option<Self> {
        if raw == 0 || raw > Self::MAX {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Get the raw MMSI number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for VesselId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:09}", self.0)
    }
}

impl TryFrom<u64> for VesselId {
    type Error = DomainError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        u32::try_from(raw)
            .ok()
            .and_then(Self::new)
            .ok_or(DomainError::InvalidVesselId { raw })
    }
}

impl TryFrom<i64> for VesselId {
    type Error = DomainError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        let unsigned = u64::try_from(raw).map_err(|_| DomainError::InvalidVesselId {
            raw: raw.unsigned_abs(),
        })?;
        Self::try_from(unsigned)
    }
}

impl From<VesselId> for u64 {
    fn from(id: VesselId) -> Self {
        u64::from(id.0)
    }
}

impl From<VesselId> for i64 {
    fn from(id: VesselId) -> Self {
        i64::from(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_and_ten_digit_values() {
        assert!(VesselId::new(0).is_none());
        assert!(VesselId::new(1_000_000_000).is_none());
        assert!(VesselId::try_from(u64::MAX).is_err());
        assert!(VesselId::try_from(-5_i64).is_err());
    }

    #[test]
    fn accepts_full_mmsi_range() {
        assert_eq!(VesselId::new(1).map(VesselId::get), Some(1));
        assert_eq!(
            VesselId::try_from(u64::from(VesselId::MAX)).map(VesselId::get),
            Ok(VesselId::MAX)
        );
    }

    #[test]
    fn display_pads_to_nine_digits() {
        let id = VesselId::new(42).unwrap();
        assert_eq!(id.to_string(), "000000042");
    }

    #[test]
    fn serde_round_trip_rejects_invalid() {
        let id: VesselId = serde_json::from_str("244660000").unwrap();
        assert_eq!(id.get(), 244_660_000);
        assert!(serde_json::from_str::<VesselId>("0").is_err());
        assert!(serde_json::from_str::<VesselId>("\"abc\"").is_err());
    }
}
