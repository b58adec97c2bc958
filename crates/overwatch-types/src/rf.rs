//! RF sensor inputs to the CoT codec.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::SensorId;
use crate::structs::Position;

/// Optional measurement metadata attached to a detection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RfMetadata {
    /// Modulation scheme, when the classifier identified one.
    #[serde(default)]
    pub modulation: Option<String>,
    /// Signal-to-noise ratio in dB.
    #[serde(default)]
    pub snr_db: Option<f64>,
}

/// A single RF emission detected by a sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RfDetection {
    /// Id of the reporting sensor. May be empty for ad hoc detections.
    #[serde(default)]
    pub sensor_id: SensorId,
    /// Human-readable sensor name.
    #[serde(default)]
    pub sensor_name: String,
    /// Time of detection.
    pub timestamp: DateTime<Utc>,
    /// Centre frequency in Hz.
    pub frequency_hz: f64,
    /// Received power in dBm.
    pub power_dbm: f64,
    /// Occupied bandwidth in Hz.
    pub bandwidth_hz: f64,
    /// Signal type, matched against the CoT signal table.
    pub signal_type: String,
    /// Classifier label.
    #[serde(default)]
    pub classification: String,
    /// Classifier confidence in `[0, 1]`.
    pub confidence: f64,
    /// Estimated emitter location.
    pub location: Position,
    /// Bearing from the sensor in degrees.
    #[serde(default)]
    pub bearing: Option<f64>,
    /// Extra measurements.
    #[serde(default)]
    pub metadata: Option<RfMetadata>,
}

impl RfDetection {
    /// Frequency in MHz.
    pub fn frequency_mhz(&self) -> f64 {
        self.frequency_hz / 1e6
    }

    /// Bandwidth in kHz.
    pub fn bandwidth_khz(&self) -> f64 {
        self.bandwidth_hz / 1e3
    }
}

/// Frequency coverage of a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FrequencyRange {
    /// Lower bound in Hz.
    pub min_hz: f64,
    /// Upper bound in Hz.
    pub max_hz: f64,
}

/// A deployed RF sensor, published as a persistent CoT marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SensorDescriptor {
    /// Sensor id; becomes the CoT uid.
    pub id: SensorId,
    /// Display name.
    pub name: String,
    /// Installed location.
    pub location: Position,
    /// Operational status label, e.g. `active`.
    pub status: String,
    /// Tuning range, when known.
    #[serde(default)]
    pub frequency_range: Option<FrequencyRange>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_deserializes_without_optional_fields() {
        let json = r#"{
            "timestamp": "2024-05-01T12:00:00Z",
            "frequency_hz": 2450000000.0,
            "power_dbm": -62.3,
            "bandwidth_hz": 20000.0,
            "signal_type": "WiFi 2.4GHz",
            "confidence": 0.91,
            "location": {"lat": 38.9, "lon": -77.0, "alt": null}
        }"#;
        let det: Result<RfDetection, _> = serde_json::from_str(json);
        assert!(det.is_ok());
        let det = det.ok();
        assert!(det.as_ref().is_some_and(|d| d.sensor_id.is_empty()));
        assert!(det.as_ref().is_some_and(|d| d.bearing.is_none()));
        assert!(
            det.is_some_and(|d| (d.frequency_mhz() - 2450.0).abs() < 1e-9
                && (d.bandwidth_khz() - 20.0).abs() < 1e-9)
        );
    }
}
