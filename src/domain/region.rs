//! Named geographic regions used for membership queries.

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Rectangular latitude/longitude bound.
///
/// Containment is a closed-interval test on each axis independently, so a
/// point lying exactly on an edge or corner is inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Build a bounding box, checking edge ordering and coordinate ranges.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidRegionBounds`] when `south > north`,
    /// `west > east`, or an edge lies outside the valid coordinate range.
    pub fn try_new(
        name: &str,
        south: f64,
        west: f64,
        north: f64,
        east: f64,
    ) -> Result<Self, DomainError> {
        let invalid = |reason: &str| DomainError::InvalidRegionBounds {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if ![south, west, north, east].iter().all(|v| v.is_finite()) {
            return Err(invalid("edges must be finite"));
        }
        if !(-90.0..=90.0).contains(&south) || !(-90.0..=90.0).contains(&north) {
            return Err(invalid("latitude edges must be within [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&west) || !(-180.0..=180.0).contains(&east) {
            return Err(invalid("longitude edges must be within [-180, 180]"));
        }
        if south > north {
            return Err(invalid("south edge exceeds north edge"));
        }
        if west > east {
            return Err(invalid("west edge exceeds east edge"));
        }

        Ok(Self {
            south,
            west,
            north,
            east,
        })
    }

    /// Closed-interval containment test.
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        self.south <= latitude
            && latitude <= self.north
            && self.west <= longitude
            && longitude <= self.east
    }

    /// Center point as `(lat, lon)`.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// Corner pair in the feed's subscription layout: `[[south, west], [north, east]]`.
    #[must_use]
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[self.south, self.west], [self.north, self.east]]
    }
}

/// A named region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub bounds: BoundingBox,
}

impl Region {
    /// Create a region with validated bounds.
    ///
    /// # Errors
    /// Returns an error when the bounds are invalid.
    pub fn try_new(
        name: impl Into<String>,
        south: f64,
        west: f64,
        north: f64,
        east: f64,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        let bounds = BoundingBox::try_new(&name, south, west, north, east)?;
        Ok(Self { name, bounds })
    }

    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        self.bounds.contains(latitude, longitude)
    }
}

/// Built-in region table used when the configuration names none.
///
/// Edges are `(south, west, north, east)`.
const DEFAULT_REGIONS: [(&str, [f64; 4]); 9] = [
    ("persian_gulf", [22.0, 48.0, 30.0, 60.0]),
    ("singapore_strait", [0.0, 100.0, 6.0, 106.0]),
    ("suez_canal", [29.0, 32.0, 32.0, 34.0]),
    ("us_gulf", [25.0, -98.0, 31.0, -80.0]),
    ("north_sea", [51.0, -4.0, 62.0, 10.0]),
    ("mediterranean", [30.0, -6.0, 46.0, 37.0]),
    ("malacca", [1.0, 98.0, 6.0, 105.0]),
    ("gibraltar", [35.0, -6.0, 37.0, -5.0]),
    ("panama", [8.0, -80.0, 10.0, -79.0]),
];

/// The built-in region table.
#[must_use]
pub fn default_regions() -> Vec<Region> {
    DEFAULT_REGIONS
        .iter()
        .map(|(name, [south, west, north, east])| Region {
            name: (*name).to_string(),
            bounds: BoundingBox {
                south: *south,
                west: *west,
                north: *north,
                east: *east,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gibraltar() -> Region {
        Region::try_new("gibraltar", 35.0, -6.0, 37.0, -5.0).unwrap()
    }

    #[test]
    fn boundary_points_are_members() {
        let region = gibraltar();
        assert!(region.contains(35.0, -6.0));
        assert!(region.contains(37.0, -5.0));
        assert!(region.contains(36.0, -6.0));
        assert!(region.contains(35.0, -5.5));
    }

    #[test]
    fn points_just_outside_are_not_members() {
        let region = gibraltar();
        assert!(!region.contains(34.999, -5.5));
        assert!(!region.contains(36.0, -4.999));
        assert!(!region.contains(37.0001, -5.0));
    }

    #[test]
    fn rejects_inverted_edges() {
        let err = Region::try_new("bad", 10.0, 0.0, 5.0, 1.0).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRegionBounds { .. }));
        assert!(Region::try_new("bad", 0.0, 5.0, 1.0, 1.0).is_err());
        assert!(Region::try_new("bad", -91.0, 0.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn default_table_is_valid() {
        for region in default_regions() {
            let b = region.bounds;
            assert!(Region::try_new(region.name.clone(), b.south, b.west, b.north, b.east).is_ok());
        }
    }

    #[test]
    fn corners_match_subscription_layout() {
        assert_eq!(gibraltar().bounds.corners(), [[35.0, -6.0], [37.0, -5.0]]);
        assert_eq!(gibraltar().bounds.center(), (36.0, -5.5));
    }
}
