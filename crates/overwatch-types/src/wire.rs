//! Payloads of the live event stream and the map-state snapshot.
//!
//! Field names follow the server's JSON. Identifying and positional fields
//! are optional so that a partially populated payload still deserializes;
//! rejecting it is the synchronizer's job, not the transport's.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::structs::IconRef;

// ---------------------------------------------------------------------------
// Per-kind payloads
// ---------------------------------------------------------------------------

/// A position report (`point` event, also embedded in other payloads).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PointPayload {
    /// Uid of the entity this point belongs to.
    pub uid: Option<String>,
    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees; values above 180 mean "unset".
    pub longitude: Option<f64>,
    /// Height above ellipsoid in metres.
    #[serde(default)]
    pub hae: Option<f64>,
    /// Device azimuth in degrees.
    #[serde(default)]
    pub azimuth: Option<f64>,
    /// Course over ground in degrees.
    #[serde(default)]
    pub course: Option<f64>,
    /// Uid of the reporting device.
    #[serde(default)]
    pub device_uid: Option<String>,
    /// Field of view of the device camera in degrees.
    #[serde(default)]
    pub fov: Option<f64>,
    /// CoT type the point was reported with.
    #[serde(default, rename = "type")]
    pub cot_type: Option<String>,
}

/// A placed marker (`marker` event).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MarkerPayload {
    /// Marker uid.
    pub uid: Option<String>,
    /// Marker position.
    pub point: Option<PointPayload>,
    /// Marker label.
    #[serde(default)]
    pub callsign: Option<String>,
    /// Marker colour as `AARRGGBB`.
    #[serde(default)]
    pub color_hex: Option<String>,
    /// MIL-STD-2525 symbol code.
    #[serde(default, alias = "mil_std_2525c")]
    pub classification_code: Option<String>,
    /// Explicit icon asset.
    #[serde(default)]
    pub icon: Option<IconRef>,
    /// Iconset path; spot-map markers carry `COT_MAPPING_SPOTMAP`.
    #[serde(default)]
    pub iconset_path: Option<String>,
    /// Battle dimension of the symbol.
    #[serde(default)]
    pub battle_dimension: Option<String>,
}

/// An end-user device (`eud` event).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EudPayload {
    /// Device uid.
    pub uid: Option<String>,
    /// Device callsign.
    #[serde(default)]
    pub callsign: Option<String>,
    /// Team colour name or hex value.
    #[serde(default)]
    pub team_color: Option<String>,
    /// `Connected` or `Disconnected`.
    #[serde(default)]
    pub last_status: Option<String>,
    /// Most recent position report.
    #[serde(default)]
    pub last_point: Option<PointPayload>,
    /// CoT type of the device, used when no point is known.
    #[serde(default, rename = "type")]
    pub cot_type: Option<String>,
}

/// A range and bearing line (`rb_line` event).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RbLinePayload {
    /// Line uid.
    pub uid: Option<String>,
    /// Anchor point.
    pub point: Option<PointPayload>,
    /// Far-end latitude.
    #[serde(default)]
    pub end_latitude: Option<f64>,
    /// Far-end longitude.
    #[serde(default)]
    pub end_longitude: Option<f64>,
    /// Line length in metres, used when the far end is not given.
    #[serde(default)]
    pub range: Option<f64>,
    /// Line bearing in degrees, used when the far end is not given.
    #[serde(default)]
    pub bearing: Option<f64>,
    /// Line colour as `AARRGGBB`.
    #[serde(default)]
    pub color_hex: Option<String>,
    /// Line weight.
    #[serde(default)]
    pub stroke_weight: Option<f64>,
    /// Line label.
    #[serde(default)]
    pub callsign: Option<String>,
}

/// A medical evacuation request (`casevac` event).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CasevacPayload {
    /// Request uid.
    pub uid: Option<String>,
    /// Request title.
    #[serde(default)]
    pub title: Option<String>,
    /// Pickup point.
    pub point: Option<PointPayload>,
    /// Icon published with the request.
    #[serde(default)]
    pub icon: Option<IconRef>,
}

// ---------------------------------------------------------------------------
// Tagged union
// ---------------------------------------------------------------------------

/// The kind of a live event, matching the server's event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum LiveEventKind {
    /// `point`
    Point,
    /// `marker`
    Marker,
    /// `eud`
    Eud,
    /// `rb_line`
    RbLine,
    /// `casevac`
    Casevac,
}

impl LiveEventKind {
    /// All kinds, in the order the server documents them.
    pub const ALL: [Self; 5] = [Self::Point, Self::Marker, Self::Eud, Self::RbLine, Self::Casevac];

    /// The server's event name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Marker => "marker",
            Self::Eud => "eud",
            Self::RbLine => "rb_line",
            Self::Casevac => "casevac",
        }
    }

    /// Look a kind up by event name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl core::fmt::Display for LiveEventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One event of the live stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum LiveEvent {
    /// Position update for an existing entity.
    Point(PointPayload),
    /// Marker create or update.
    Marker(MarkerPayload),
    /// Unit track create or update.
    Eud(EudPayload),
    /// Range and bearing line create or update.
    RbLine(RbLinePayload),
    /// Casevac request create or update.
    Casevac(CasevacPayload),
}

impl LiveEvent {
    /// Decode a bare payload whose kind is known from the channel it
    /// arrived on.
    pub fn decode(kind: LiveEventKind, payload: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            LiveEventKind::Point => Self::Point(serde_json::from_slice(payload)?),
            LiveEventKind::Marker => Self::Marker(serde_json::from_slice(payload)?),
            LiveEventKind::Eud => Self::Eud(serde_json::from_slice(payload)?),
            LiveEventKind::RbLine => Self::RbLine(serde_json::from_slice(payload)?),
            LiveEventKind::Casevac => Self::Casevac(serde_json::from_slice(payload)?),
        })
    }

    /// The kind of this event.
    pub const fn kind(&self) -> LiveEventKind {
        match self {
            Self::Point(_) => LiveEventKind::Point,
            Self::Marker(_) => LiveEventKind::Marker,
            Self::Eud(_) => LiveEventKind::Eud,
            Self::RbLine(_) => LiveEventKind::RbLine,
            Self::Casevac(_) => LiveEventKind::Casevac,
        }
    }

    /// The uid carried by the payload, if any.
    pub fn uid(&self) -> Option<&str> {
        match self {
            Self::Point(p) => p.uid.as_deref(),
            Self::Marker(m) => m.uid.as_deref(),
            Self::Eud(e) => e.uid.as_deref(),
            Self::RbLine(r) => r.uid.as_deref(),
            Self::Casevac(c) => c.uid.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Full map state as returned by the snapshot endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MapStateSnapshot {
    /// Unit tracks.
    #[serde(default)]
    pub euds: Vec<EudPayload>,
    /// Markers (including spot-map markers).
    #[serde(default)]
    pub markers: Vec<MarkerPayload>,
    /// Range and bearing lines.
    #[serde(default)]
    pub rb_lines: Vec<RbLinePayload>,
    /// Casevac requests.
    #[serde(default)]
    pub casevacs: Vec<CasevacPayload>,
}

impl MapStateSnapshot {
    /// Total number of items across all collections.
    pub fn len(&self) -> usize {
        self.euds
            .len()
            .saturating_add(self.markers.len())
            .saturating_add(self.rb_lines.len())
            .saturating_add(self.casevacs.len())
    }

    /// Whether the snapshot holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
