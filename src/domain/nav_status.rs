//! AIS navigational status codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Navigational status reported in AIS position reports (codes 0-15).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NavigationalStatus {
    UnderWayUsingEngine,
    AtAnchor,
    NotUnderCommand,
    RestrictedManoeuvrability,
    ConstrainedByDraught,
    Moored,
    Aground,
    EngagedInFishing,
    UnderWaySailing,
    ReservedHsc,
    ReservedWig,
    Reserved11,
    Reserved12,
    Reserved13,
    AisSart,
    NotDefined,
}

impl NavigationalStatus {
    const ALL: [Self; 16] = [
        Self::UnderWayUsingEngine,
        Self::AtAnchor,
        Self::NotUnderCommand,
        Self::RestrictedManoeuvrability,
        Self::ConstrainedByDraught,
        Self::Moored,
        Self::Aground,
        Self::EngagedInFishing,
        Self::UnderWaySailing,
        Self::ReservedHsc,
        Self::ReservedWig,
        Self::Reserved11,
        Self::Reserved12,
        Self::Reserved13,
        Self::AisSart,
        Self::NotDefined,
    ];

    /// Map a raw AIS code to a status. Codes above 15 are not defined.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// The raw AIS code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Stable human-readable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnderWayUsingEngine => "Under way using engine",
            Self::AtAnchor => "At anchor",
            Self::NotUnderCommand => "Not under command",
            Self::RestrictedManoeuvrability => "Restricted manoeuvrability",
            Self::ConstrainedByDraught => "Constrained by draught",
            Self::Moored => "Moored",
            Self::Aground => "Aground",
            Self::EngagedInFishing => "Engaged in fishing",
            Self::UnderWaySailing => "Under way sailing",
            Self::ReservedHsc => "Reserved (HSC)",
            Self::ReservedWig => "Reserved (WIG)",
            Self::Reserved11 | Self::Reserved12 | Self::Reserved13 => "Reserved",
            Self::AisSart => "AIS-SART active",
            Self::NotDefined => "Not defined",
        }
    }

    #[must_use]
    pub const fn is_underway(self) -> bool {
        matches!(self, Self::UnderWayUsingEngine | Self::UnderWaySailing)
    }

    #[must_use]
    pub const fn is_stationary(self) -> bool {
        matches!(self, Self::AtAnchor | Self::Moored | Self::Aground)
    }

    /// Statuses that warrant operator attention.
    #[must_use]
    pub const fn is_emergency(self) -> bool {
        matches!(self, Self::NotUnderCommand | Self::Aground | Self::AisSart)
    }
}

impl TryFrom<u8> for NavigationalStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("unknown navigational status {code}"))
    }
}

impl From<NavigationalStatus> for u8 {
    fn from(status: NavigationalStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for NavigationalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
