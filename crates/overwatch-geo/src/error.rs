//! Error types for the `overwatch-geo` crate.

use overwatch_types::LatLon;

/// Errors raised by geometry operations that reject their input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoError {
    /// A coordinate is non-finite or outside the valid lat/lon range.
    #[error("coordinate is not a known position: ({}, {})", .0.lat, .0.lon)]
    UnknownPosition(LatLon),

    /// A scalar input (angle or distance) is non-finite or negative.
    #[error("invalid {name}: {value}")]
    InvalidParameter {
        /// Which parameter was rejected.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// An operation that needs at least one point received none.
    #[error("no points supplied")]
    EmptyPointSet,
}
