//! Measurement sessions for the measure tool.
//!
//! A session accumulates clicked points and keeps a running great-circle
//! total. It owns nothing outside itself; dropping it is the whole of
//! "leaving measure mode".

use std::fmt;

use overwatch_types::LatLon;
use serde::Serialize;
use ts_rs::TS;

use crate::error::GeoError;
use crate::geodesy::haversine_m;

/// An ordered sequence of measured points with a running total.
#[derive(Debug, Clone, Default)]
pub struct MeasurementSession {
    points: Vec<LatLon>,
    total_m: f64,
}

impl MeasurementSession {
    /// Start an empty session.
    pub const fn new() -> Self {
        Self {
            points: Vec::new(),
            total_m: 0.0,
        }
    }

    /// Append a point and return the new running total in metres.
    pub fn add_point(&mut self, point: LatLon) -> Result<f64, GeoError> {
        if !point.is_known() {
            return Err(GeoError::UnknownPosition(point));
        }
        if let Some(last) = self.points.last() {
            self.total_m += haversine_m(*last, point);
        }
        self.points.push(point);
        Ok(self.total_m)
    }

    /// Remove the most recent point.
    pub fn undo_last(&mut self) -> Option<LatLon> {
        let removed = self.points.pop()?;
        if let Some(last) = self.points.last() {
            self.total_m -= haversine_m(*last, removed);
        }
        if self.points.len() < 2 {
            self.total_m = 0.0;
        }
        Some(removed)
    }

    /// Points in click order.
    pub fn points(&self) -> &[LatLon] {
        &self.points
    }

    /// Running total in metres.
    pub const fn total_meters(&self) -> f64 {
        self.total_m
    }

    /// Length of the most recently added segment, once there is one.
    pub fn last_segment_meters(&self) -> Option<f64> {
        let mut tail = self.points.iter().rev();
        let last = tail.next()?;
        let prev = tail.next()?;
        Some(haversine_m(*prev, *last))
    }

    /// Snapshot of the session for display.
    pub fn summary(&self) -> MeasurementSummary {
        MeasurementSummary {
            total_km: self.total_m / 1000.0,
            total_m: self.total_m,
            points: self.points.len(),
        }
    }

    /// Discard all points.
    pub fn clear(&mut self) {
        self.points.clear();
        self.total_m = 0.0;
    }
}

/// Display form of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MeasurementSummary {
    /// Total in kilometres.
    pub total_km: f64,
    /// Total in metres.
    pub total_m: f64,
    /// Number of points.
    pub points: usize,
}

impl fmt::Display for MeasurementSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3} km ({:.0} m), {} points",
            self.total_km, self.total_m, self.points
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::{DistanceUnit, destination};

    const START: LatLon = LatLon::new(51.5, -0.12);

    #[test]
    fn running_total_tracks_points() {
        let mut session = MeasurementSession::new();
        assert_eq!(session.add_point(START), Ok(0.0));
        assert_eq!(session.last_segment_meters(), None);

        let b = destination(START, 90.0, 1_000.0, DistanceUnit::Meters);
        let c = destination(b, 0.0, 500.0, DistanceUnit::Meters);
        session.add_point(b).ok();
        let total = session.add_point(c).unwrap_or_default();

        assert!((total - 1_500.0).abs() < 1e-6);
        assert!(session.last_segment_meters().is_some_and(|s| (s - 500.0).abs() < 1e-6));
        assert_eq!(session.points().len(), 3);
    }

    #[test]
    fn undo_restores_previous_total() {
        let mut session = MeasurementSession::new();
        let b = destination(START, 45.0, 2_000.0, DistanceUnit::Meters);
        let c = destination(b, 180.0, 300.0, DistanceUnit::Meters);
        session.add_point(START).ok();
        session.add_point(b).ok();
        session.add_point(c).ok();

        assert_eq!(session.undo_last(), Some(c));
        assert!((session.total_meters() - 2_000.0).abs() < 1e-6);
        session.undo_last();
        assert!(session.total_meters().abs() < f64::EPSILON);
        session.undo_last();
        assert_eq!(session.undo_last(), None);
    }

    #[test]
    fn unknown_points_are_rejected() {
        let mut session = MeasurementSession::new();
        assert!(session.add_point(LatLon::new(0.0, 999.0)).is_err());
        assert!(session.points().is_empty());
    }

    #[test]
    fn summary_formats_like_the_measure_popup() {
        let mut session = MeasurementSession::new();
        session.add_point(START).ok();
        session
            .add_point(destination(START, 270.0, 1_234.4, DistanceUnit::Meters))
            .ok();
        assert_eq!(session.summary().to_string(), "1.234 km (1234 m), 2 points");

        session.clear();
        assert_eq!(session.summary().to_string(), "0.000 km (0 m), 0 points");
    }
}
