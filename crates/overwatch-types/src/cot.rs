//! The canonical Cursor-on-Target event record.
//!
//! This is the in-memory form produced by the encoders and consumed by the
//! XML writer. Optional blocks are `Option` so the writer can omit them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A CoT `<event>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CotEvent {
    /// Event uid.
    pub uid: String,
    /// CoT type code, e.g. `a-f-G-E-S`.
    #[serde(rename = "type")]
    pub cot_type: String,
    /// How the position was obtained, e.g. `m-g`.
    pub how: String,
    /// Generation time.
    pub time: DateTime<Utc>,
    /// Start of validity.
    pub start: DateTime<Utc>,
    /// End of validity.
    pub stale: DateTime<Utc>,
    /// Position and error estimates.
    pub point: CotPoint,
    /// Detail block.
    pub detail: CotDetail,
}

/// A CoT `<point>`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CotPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Height above ellipsoid in metres.
    pub hae: f64,
    /// Circular error in metres.
    pub ce: f64,
    /// Linear error in metres.
    pub le: f64,
}

/// A CoT `<detail>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CotDetail {
    /// `<contact>`.
    pub contact: Option<CotContact>,
    /// `<remarks>` text.
    pub remarks: Option<String>,
    /// `<rf_signal>`.
    pub rf_signal: Option<RfSignalDetail>,
    /// `<sensor>`.
    pub sensor: Option<SensorDetail>,
    /// `<link>` elements, in document order.
    #[serde(default)]
    pub links: Vec<CotLink>,
}

/// A CoT `<contact>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CotContact {
    /// Display callsign.
    pub callsign: String,
}

/// The `<rf_signal>` extension element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RfSignalDetail {
    /// Frequency in MHz.
    pub frequency_mhz: f64,
    /// Power in dBm.
    pub power_dbm: f64,
    /// Bandwidth in kHz.
    pub bandwidth_khz: f64,
    /// Signal type.
    pub signal_type: String,
    /// Classification label.
    pub classification: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Modulation, omitted when unknown.
    pub modulation: Option<String>,
    /// SNR in dB, omitted when unknown.
    pub snr_db: Option<f64>,
}

/// A CoT `<sensor>` element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SensorDetail {
    /// Field of view in degrees.
    pub fov: Option<f64>,
    /// Range in metres.
    pub range: Option<f64>,
    /// Azimuth in degrees.
    pub azimuth: Option<f64>,
    /// Elevation in degrees.
    pub elevation: Option<f64>,
}

/// A CoT `<link>` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CotLink {
    /// Uid of the linked event.
    pub uid: String,
    /// Relation code; `p-p` is parent to child.
    pub relation: String,
    /// CoT type of the linked event.
    #[serde(rename = "type")]
    pub link_type: String,
}
