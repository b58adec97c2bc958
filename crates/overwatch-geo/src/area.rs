//! Rectangular bounds and their approximate area.

use overwatch_types::LatLon;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::GeoError;

/// Kilometres per degree of latitude (and of longitude at the equator).
pub const KM_PER_DEGREE: f64 = 111.32;

/// An axis-aligned lat/lon rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BoundingBox {
    /// Southern edge.
    pub south: f64,
    /// Western edge.
    pub west: f64,
    /// Northern edge.
    pub north: f64,
    /// Eastern edge.
    pub east: f64,
}

impl BoundingBox {
    /// Smallest box enclosing every known point.
    ///
    /// Unknown positions are skipped; if none remain the set is empty.
    pub fn from_points(points: &[LatLon]) -> Result<Self, GeoError> {
        let mut known = points.iter().filter(|p| p.is_known());
        let first = known.next().ok_or(GeoError::EmptyPointSet)?;
        let seed = Self {
            south: first.lat,
            west: first.lon,
            north: first.lat,
            east: first.lon,
        };
        Ok(known.fold(seed, |b, p| Self {
            south: b.south.min(p.lat),
            west: b.west.min(p.lon),
            north: b.north.max(p.lat),
            east: b.east.max(p.lon),
        }))
    }

    /// Centre of the box.
    pub fn center(&self) -> LatLon {
        LatLon::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// Whether `p` lies inside or on the edge of the box.
    pub fn contains(&self, p: LatLon) -> bool {
        (self.south..=self.north).contains(&p.lat) && (self.west..=self.east).contains(&p.lon)
    }
}

/// Rough area of the box in square kilometres.
///
/// Latitude span is scaled by a fixed kilometres-per-degree figure and the
/// longitude span additionally by the cosine of the mid-latitude. This is an
/// estimate for summaries only; it is not geodesically exact and degrades
/// for large or high-latitude boxes.
pub fn approx_area_km2(bounds: &BoundingBox) -> f64 {
    let mid_lat = ((bounds.south + bounds.north) / 2.0).to_radians();
    let height_km = (bounds.north - bounds.south).abs() * KM_PER_DEGREE;
    let width_km = (bounds.east - bounds.west).abs() * KM_PER_DEGREE * mid_lat.cos();
    height_km * width_km
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_skip_unknown_points() {
        let points = [
            LatLon::new(10.0, 20.0),
            LatLon::new(999.0, 999.0),
            LatLon::new(11.0, 19.0),
        ];
        let b = BoundingBox::from_points(&points);
        assert_eq!(
            b,
            Ok(BoundingBox {
                south: 10.0,
                west: 19.0,
                north: 11.0,
                east: 20.0
            })
        );
        assert!(b.is_ok_and(|b| b.contains(LatLon::new(10.5, 19.5))));
    }

    #[test]
    fn empty_bounds_are_an_error() {
        assert_eq!(BoundingBox::from_points(&[]), Err(GeoError::EmptyPointSet));
    }

    #[test]
    fn equatorial_degree_square() {
        let b = BoundingBox {
            south: 0.0,
            west: 0.0,
            north: 1.0,
            east: 1.0,
        };
        let area = approx_area_km2(&b);
        // cos(0.5 deg) shaves a hair off 111.32^2
        assert!((area - 12_391.8).abs() < 1.0);
    }

    #[test]
    fn area_shrinks_with_latitude() {
        let low = BoundingBox { south: 0.0, west: 0.0, north: 1.0, east: 1.0 };
        let high = BoundingBox { south: 60.0, west: 0.0, north: 61.0, east: 1.0 };
        assert!(approx_area_km2(&high) < approx_area_km2(&low) * 0.6);
    }
}
