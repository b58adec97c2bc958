//! Core entity structs for the tactical picture.
//!
//! [`Entity`] is the registry record owned by the synchronizer. The derived
//! geometry ([`FieldOfViewCone`], [`RangeBearingSegment`]) is keyed by the
//! uid of the entity that owns it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Affiliation, EntityKind, LinkStatus};
use crate::ids::EntityUid;

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A bare latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LatLon {
    /// Latitude in decimal degrees, positive north.
    pub lat: f64,
    /// Longitude in decimal degrees, positive east.
    pub lon: f64,
}

impl LatLon {
    /// Create a new coordinate pair.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether this pair is a real coordinate.
    ///
    /// Servers use out-of-range values (typically `999` or `999999`) to mean
    /// "position not yet known"; those, and non-finite values, are rejected.
    pub fn is_known(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && self.lat.abs() <= 90.0
            && self.lon.abs() <= 180.0
    }
}

/// A reported position with optional altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Height above ellipsoid in metres, if reported.
    pub alt: Option<f64>,
}

impl Position {
    /// Create a position without altitude.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon, alt: None }
    }

    /// The horizontal component of this position.
    pub const fn lat_lon(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }

    /// Whether this position is a real coordinate (see [`LatLon::is_known`]).
    pub fn is_known(&self) -> bool {
        self.lat_lon().is_known()
    }
}

/// Facing of an entity.
///
/// Azimuth (device orientation) and course (direction of travel) are both
/// clockwise from true north in degrees. When both are reported the azimuth
/// wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Heading {
    /// Device azimuth in degrees.
    pub azimuth: Option<f64>,
    /// Course over ground in degrees.
    pub course: Option<f64>,
}

impl Heading {
    /// The direction the entity is facing: azimuth, else course.
    pub fn facing(&self) -> Option<f64> {
        self.azimuth.or(self.course)
    }
}

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// An icon asset reference as published by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct IconRef {
    /// URL or path of the icon bitmap.
    pub bitmap: Option<String>,
    /// URL or path of the icon shadow bitmap.
    pub shadow: Option<String>,
}

/// Visual classification attached to an entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Style {
    /// Team or marker colour as `#RRGGBB`.
    pub color_hex: Option<String>,
    /// MIL-STD-2525 symbol identification code.
    pub classification: Option<String>,
    /// Standard identity derived from the classification or CoT type.
    pub affiliation: Affiliation,
    /// Explicit icon asset, if the publisher chose one.
    pub icon: Option<IconRef>,
    /// The CoT type code the entity was last reported with.
    pub cot_type: Option<String>,
    /// Line weight for line-shaped entities.
    pub stroke_weight: Option<f64>,
}

/// Normalise a server colour string into `#RRGGBB`.
///
/// TAK colours arrive as `AARRGGBB` hex; the alpha byte is dropped. Six
/// digit values and values already prefixed with `#` pass through.
pub fn normalize_color_hex(raw: &str) -> String {
    let digits = raw.trim().trim_start_matches('#');
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);
    if digits.len() == 8 {
        format!("#{}", digits.get(2..).unwrap_or(digits))
    } else {
        format!("#{digits}")
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A trackable object on the tactical picture.
///
/// Created on first sighting, updated in place on every subsequent event
/// bearing the same uid, and removed only through an explicit removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Entity {
    /// Stable unique identifier.
    pub uid: EntityUid,
    /// Which kind of object this is.
    pub kind: EntityKind,
    /// Display name (callsign, marker label, or casevac title).
    pub callsign: String,
    /// Last valid position; `None` while unknown.
    pub position: Option<Position>,
    /// Last reported facing.
    pub heading: Heading,
    /// Angular width of the device's field of view in degrees.
    pub fov_deg: Option<f64>,
    /// Connection state.
    pub status: LinkStatus,
    /// Visual classification.
    pub style: Style,
    /// Arrival sequence number of the event that last touched this entity.
    pub revision: u64,
}

impl Entity {
    /// Create an entity with no position, facing, or style.
    pub fn new(uid: EntityUid, kind: EntityKind) -> Self {
        Self {
            uid,
            kind,
            callsign: String::new(),
            position: None,
            heading: Heading::default(),
            fov_deg: None,
            status: LinkStatus::Connected,
            style: Style::default(),
            revision: 0,
        }
    }

    /// Whether the entity has a position that may be rendered.
    pub fn has_known_position(&self) -> bool {
        self.position.is_some_and(|p| p.is_known())
    }
}

// ---------------------------------------------------------------------------
// Derived geometry
// ---------------------------------------------------------------------------

/// A triangular ground-projected field of view.
///
/// Vertex order is origin, left edge, right edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FieldOfViewCone {
    /// The entity this cone belongs to.
    pub owner: EntityUid,
    /// Origin, left-edge, and right-edge points.
    pub vertices: [LatLon; 3],
    /// Centre bearing of the cone in degrees.
    pub azimuth_deg: f64,
    /// Angular width of the cone in degrees.
    pub fov_deg: f64,
    /// Length of the cone edges in metres.
    pub range_m: f64,
}

/// The drawn segment of a range and bearing line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RangeBearingSegment {
    /// The entity this segment belongs to.
    pub uid: EntityUid,
    /// Anchor point of the line.
    pub start: LatLon,
    /// Far end of the line.
    pub end: LatLon,
    /// Line colour as `#RRGGBB`.
    pub color_hex: Option<String>,
    /// Line weight.
    pub stroke_weight: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_positions_are_unknown() {
        assert!(LatLon::new(38.9, -77.0).is_known());
        assert!(!LatLon::new(999.0, 999.0).is_known());
        assert!(!LatLon::new(38.9, 999_999.0).is_known());
        assert!(!LatLon::new(f64::NAN, 0.0).is_known());
        assert!(LatLon::new(-90.0, 180.0).is_known());
    }

    #[test]
    fn heading_prefers_azimuth() {
        let both = Heading { azimuth: Some(45.0), course: Some(90.0) };
        assert_eq!(both.facing(), Some(45.0));

        let course_only = Heading { azimuth: None, course: Some(90.0) };
        assert_eq!(course_only.facing(), Some(90.0));

        assert_eq!(Heading::default().facing(), None);
    }

    #[test]
    fn color_hex_drops_alpha() {
        assert_eq!(normalize_color_hex("ff0000ff"), "#0000ff");
        assert_eq!(normalize_color_hex("#00ff00"), "#00ff00");
        assert_eq!(normalize_color_hex("00ff00"), "#00ff00");
        assert_eq!(normalize_color_hex("0xffff0000"), "#ff0000");
    }

    #[test]
    fn new_entity_has_no_position() {
        let entity = Entity::new(EntityUid::from("u1"), EntityKind::UnitTrack);
        assert!(!entity.has_known_position());
        assert!(entity.status.is_connected());
    }
}
