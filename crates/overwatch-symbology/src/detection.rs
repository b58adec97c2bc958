//! Map styling for RF detections and sensors.

use overwatch_types::RfDetection;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Smallest detection glyph in pixels.
pub const MIN_GLYPH_PX: f64 = 20.0;

/// Largest detection glyph in pixels.
pub const MAX_GLYPH_PX: f64 = 40.0;

/// Confidence above which an otherwise ordinary detection is shown as high
/// confidence.
pub const HIGH_CONFIDENCE: f64 = 0.8;

/// Broad category of a detection, from its signal type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SignalCategory {
    /// Signal type mentions jamming.
    Jamming,
    /// Signal type mentions radar.
    Radar,
    /// Signal type mentions a tactical system.
    Tactical,
    /// Everything else.
    Other,
}

impl SignalCategory {
    /// Categorise a free-text signal type.
    pub fn of(signal_type: &str) -> Self {
        if signal_type.contains("Jamming") {
            Self::Jamming
        } else if signal_type.contains("Radar") {
            Self::Radar
        } else if signal_type.contains("Tactical") {
            Self::Tactical
        } else {
            Self::Other
        }
    }
}

/// How a detection should be drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DetectionGlyph {
    /// Glyph colour.
    pub color_hex: String,
    /// Glyph diameter in pixels.
    pub size_px: f64,
    /// Signal category.
    pub category: SignalCategory,
}

/// Style a detection glyph.
///
/// Colour comes from the category; ordinary signals are green above the
/// high-confidence threshold and blue otherwise. Size scales with received
/// power, `power_dbm + 100` clamped to the glyph range.
pub fn detection_style(detection: &RfDetection) -> DetectionGlyph {
    let category = SignalCategory::of(&detection.signal_type);
    let color_hex = match category {
        SignalCategory::Jamming => "#ff4444",
        SignalCategory::Radar => "#ffaa00",
        SignalCategory::Tactical => "#64ffda",
        SignalCategory::Other if detection.confidence > HIGH_CONFIDENCE => "#00ff88",
        SignalCategory::Other => "#00aaff",
    };
    let size_px = if detection.power_dbm.is_finite() {
        (detection.power_dbm + 100.0).clamp(MIN_GLYPH_PX, MAX_GLYPH_PX)
    } else {
        MIN_GLYPH_PX
    };
    DetectionGlyph {
        color_hex: color_hex.to_owned(),
        size_px,
        category,
    }
}

/// Marker colour for a sensor by its status label.
pub fn sensor_color(status: &str) -> &'static str {
    if status.eq_ignore_ascii_case("online") || status.eq_ignore_ascii_case("active") {
        "#64ffda"
    } else {
        "#666666"
    }
}
