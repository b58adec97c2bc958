//! Symbology resolver for the Overwatch tactical picture.
//!
//! Maps entities and RF detections to representation variants and visual
//! parameters. Nothing here draws anything.

pub mod detection;
pub mod resolver;

pub use detection::{DetectionGlyph, SignalCategory, detection_style, sensor_color};
pub use resolver::{
    DEFAULT_COLOR, RepresentationVariant, VIDEO_STREAM_TYPE, affiliation_color, resolve,
};
