//! Ship type codes and tanker size classes.
//!
//! AIS carries the ship type as a two-digit code. The first digit is the
//! broad category; for cargo (7x) and tanker (8x) vessels the second digit
//! encodes the hazardous cargo category (1-4 = A-D).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw AIS ship type code with classification helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipType(u8);

impl ShipType {
    /// General tanker code.
    pub const TANKER: Self = Self(80);
    /// General cargo code.
    pub const CARGO: Self = Self(70);

    #[must_use]
    pub const fn new(code: u8) -> Self {
        Self(code)
    }

    #[must_use]
    pub const fn code(self) -> u8 {
        self.0
    }

    /// Cargo vessels use codes 70-79.
    #[must_use]
    pub const fn is_cargo(self) -> bool {
        self.0 >= 70 && self.0 <= 79
    }

    /// Tankers use codes 80-89.
    #[must_use]
    pub const fn is_tanker(self) -> bool {
        self.0 >= 80 && self.0 <= 89
    }

    /// Hazardous category A-D, if this is a cargo or tanker code carrying one.
    #[must_use]
    pub const fn hazard_category(self) -> Option<char> {
        if !self.is_cargo() && !self.is_tanker() {
            return None;
        }
        match self.0 % 10 {
            1 => Some('A'),
            2 => Some('B'),
            3 => Some('C'),
            4 => Some('D'),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_hazardous(self) -> bool {
        self.hazard_category().is_some()
    }

    /// Broad category label for the code.
    #[must_use]
    pub const fn category(self) -> &'static str {
        match self.0 {
            20..=29 => "Wing in ground",
            30 => "Fishing",
            31 | 32 => "Towing",
            33 => "Dredging",
            34 => "Diving",
            35 => "Military",
            36 => "Sailing",
            37 => "Pleasure craft",
            40..=49 => "High speed craft",
            50 => "Pilot vessel",
            51 => "Search and rescue",
            52 => "Tug",
            53 => "Port tender",
            55 => "Law enforcement",
            58 => "Medical transport",
            60..=69 => "Passenger",
            70..=79 => "Cargo",
            80..=89 => "Tanker",
            _ => "Other",
        }
    }
}

impl fmt::Display for ShipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.hazard_category() {
            Some(category) => write!(f, "{} - Hazardous {category}", self.category()),
            None => f.write_str(self.category()),
        }
    }
}

impl From<u8> for ShipType {
    fn from(code: u8) -> Self {
        Self(code)
    }
}

/// Tanker size classes by deadweight tonnage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TankerClass {
    Ulcc,
    Vlcc,
    Suezmax,
    Aframax,
    Panamax,
    Handymax,
    Handysize,
    Small,
}

impl TankerClass {
    /// Lower bound (inclusive) of each class, largest first.
    const LOWER_BOUNDS: [(Self, f64); 8] = [
        (Self::Ulcc, 320_000.0),
        (Self::Vlcc, 200_000.0),
        (Self::Suezmax, 120_000.0),
        (Self::Aframax, 80_000.0),
        (Self::Panamax, 60_000.0),
        (Self::Handymax, 40_000.0),
        (Self::Handysize, 10_000.0),
        (Self::Small, 0.0),
    ];

    /// Classify a deadweight tonnage. Negative or non-finite values have no class.
    #[must_use]
    pub fn classify(deadweight: f64) -> Option<Self> {
        if !deadweight.is_finite() || deadweight < 0.0 {
            return None;
        }
        Self::LOWER_BOUNDS
            .iter()
            .find(|(_, lower)| deadweight >= *lower)
            .map(|(class, _)| *class)
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Ulcc => "Ultra Large Crude Carrier (ULCC)",
            Self::Vlcc => "Very Large Crude Carrier (VLCC)",
            Self::Suezmax => "Suezmax",
            Self::Aframax => "Aframax",
            Self::Panamax => "Panamax",
            Self::Handymax => "Handymax",
            Self::Handysize => "Handysize",
            Self::Small => "Small Tanker",
        }
    }
}

impl fmt::Display for TankerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
