//! Named region table entries.

use serde::Deserialize;

use crate::domain::{error::DomainError, region::Region};

/// One `[[regions]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegionConfig {
    pub name: String,
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl TryFrom<&RegionConfig> for Region {
    type Error = DomainError;

    fn try_from(config: &RegionConfig) -> Result<Self, Self::Error> {
        Region::try_new(
            config.name.clone(),
            config.south,
            config.west,
            config.north,
            config.east,
        )
    }
}
