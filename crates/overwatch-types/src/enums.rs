//! Enumeration types for the tactical picture.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Entity kind
// ---------------------------------------------------------------------------

/// The variant of a trackable object on the tactical picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EntityKind {
    /// An end-user device reporting its own position (ATAK/WinTAK/iTAK).
    UnitTrack,
    /// A placed marker with a symbol or icon.
    StaticMarker,
    /// A spot-map marker drawn as a small coloured circle.
    SpotMarker,
    /// A medical evacuation request.
    CasevacRequest,
    /// A range and bearing line between two points.
    RangeBearingLine,
    /// A field-of-view cone published as its own object.
    FieldOfView,
}

// ---------------------------------------------------------------------------
// Link status
// ---------------------------------------------------------------------------

/// Connection state of a unit as last reported by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum LinkStatus {
    /// The device is connected and reporting.
    #[default]
    Connected,
    /// The device has dropped off the server.
    Disconnected,
}

impl LinkStatus {
    /// Parse the server's status string.
    ///
    /// Only the exact string `Connected` counts as connected; anything
    /// else, including a missing value, is treated as disconnected.
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            Some("Connected") => Self::Connected,
            _ => Self::Disconnected,
        }
    }

    /// Whether the unit is connected.
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

// ---------------------------------------------------------------------------
// Affiliation
// ---------------------------------------------------------------------------

/// Standard identity of a tracked object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Affiliation {
    /// Friend, assumed friend, or exercise friend.
    Friendly,
    /// Hostile, suspect, joker, or faker.
    Hostile,
    /// Neutral.
    Neutral,
    /// Unknown or pending.
    #[default]
    Unknown,
}

impl Affiliation {
    /// Derive the affiliation from a MIL-STD-2525 symbol identification code.
    ///
    /// The standard identity is the second character of the code
    /// (e.g. `SFGPUCI----` is friendly, `SHGPUCI----` is hostile).
    pub fn from_symbol_code(code: &str) -> Self {
        match code.chars().nth(1).map(|c| c.to_ascii_uppercase()) {
            Some('F' | 'A' | 'D' | 'M') => Self::Friendly,
            Some('H' | 'S' | 'J' | 'K') => Self::Hostile,
            Some('N' | 'L') => Self::Neutral,
            _ => Self::Unknown,
        }
    }

    /// Derive the affiliation from a CoT type code such as `a-f-G-U-C`.
    ///
    /// Only atom types (`a-...`) carry an affiliation; everything else is
    /// unknown.
    pub fn from_cot_type(cot_type: &str) -> Self {
        let mut atoms = cot_type.split('-');
        if atoms.next() != Some("a") {
            return Self::Unknown;
        }
        match atoms.next() {
            Some("f" | "a") => Self::Friendly,
            Some("h" | "s" | "j" | "k") => Self::Hostile,
            Some("n") => Self::Neutral,
            _ => Self::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_status_only_accepts_exact_connected() {
        assert_eq!(LinkStatus::from_wire(Some("Connected")), LinkStatus::Connected);
        assert_eq!(LinkStatus::from_wire(Some("connected")), LinkStatus::Disconnected);
        assert_eq!(LinkStatus::from_wire(Some("Disconnected")), LinkStatus::Disconnected);
        assert_eq!(LinkStatus::from_wire(None), LinkStatus::Disconnected);
    }

    #[test]
    fn affiliation_from_symbol_code() {
        assert_eq!(Affiliation::from_symbol_code("SFGPUCI----"), Affiliation::Friendly);
        assert_eq!(Affiliation::from_symbol_code("shgpuci----"), Affiliation::Hostile);
        assert_eq!(Affiliation::from_symbol_code("SNGP-------"), Affiliation::Neutral);
        assert_eq!(Affiliation::from_symbol_code("SUGP-------"), Affiliation::Unknown);
        assert_eq!(Affiliation::from_symbol_code("S"), Affiliation::Unknown);
    }

    #[test]
    fn affiliation_from_cot_type() {
        assert_eq!(Affiliation::from_cot_type("a-f-G-U-C"), Affiliation::Friendly);
        assert_eq!(Affiliation::from_cot_type("a-h-G-E-S-J"), Affiliation::Hostile);
        assert_eq!(Affiliation::from_cot_type("a-n-G-E-C"), Affiliation::Neutral);
        assert_eq!(Affiliation::from_cot_type("a-u-G-E-S"), Affiliation::Unknown);
        assert_eq!(Affiliation::from_cot_type("b-m-p-s-p-loc"), Affiliation::Unknown);
    }
}
