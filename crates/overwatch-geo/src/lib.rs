//! Geometry engine for the Overwatch tactical picture.
//!
//! Pure functions only: nothing here holds state beyond a
//! [`MeasurementSession`], and nothing touches the entity registry.
//!
//! # Modules
//!
//! - [`geodesy`] -- Destination point, haversine distance, bearings, cones
//! - [`area`] -- Bounding boxes and the approximate area estimate
//! - [`measure`] -- Measurement sessions for the measure tool
//! - [`coords`] -- Decimal and DMS coordinate readouts
//! - [`error`] -- Error types

pub mod area;
pub mod coords;
pub mod error;
pub mod geodesy;
pub mod measure;

pub use area::{BoundingBox, approx_area_km2};
pub use coords::{CoordinateFormat, FormattedCoordinate, format_coordinate};
pub use error::GeoError;
pub use geodesy::{
    DistanceUnit, EARTH_RADIUS_M, accumulate_distance, destination, fov_cone, haversine_m,
    initial_bearing, normalize_bearing,
};
pub use measure::{MeasurementSession, MeasurementSummary};
