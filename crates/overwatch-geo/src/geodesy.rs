//! Great-circle geodesy on a spherical Earth.
//!
//! All angles are in degrees, bearings clockwise from true north. The sphere
//! uses the IUGG mean radius, which keeps errors against the ellipsoid under
//! roughly half a percent; good enough for cones, lines and the measure tool.

use overwatch_types::LatLon;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::GeoError;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Unit of a distance argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum DistanceUnit {
    /// Metres.
    #[default]
    Meters,
    /// Kilometres.
    Kilometers,
    /// International nautical miles.
    NauticalMiles,
    /// Statute miles.
    Miles,
}

impl DistanceUnit {
    /// Number of metres in one of this unit.
    pub const fn meters_per_unit(self) -> f64 {
        match self {
            Self::Meters => 1.0,
            Self::Kilometers => 1000.0,
            Self::NauticalMiles => 1852.0,
            Self::Miles => 1609.344,
        }
    }

    /// Convert a distance in this unit to metres.
    pub fn to_meters(self, distance: f64) -> f64 {
        distance * self.meters_per_unit()
    }
}

/// Wrap a bearing into `[0, 360)`.
pub fn normalize_bearing(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Wrap a longitude into `[-180, 180)`.
fn normalize_longitude(deg: f64) -> f64 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}

/// Point reached by travelling `distance` from `origin` along the initial
/// bearing `bearing_deg`.
///
/// The bearing is normalised first, so `-90` and `270` are the same
/// direction. The result longitude is wrapped into `[-180, 180)`.
pub fn destination(origin: LatLon, bearing_deg: f64, distance: f64, unit: DistanceUnit) -> LatLon {
    let angular = unit.to_meters(distance) / EARTH_RADIUS_M;
    let theta = normalize_bearing(bearing_deg).to_radians();
    let phi1 = origin.lat.to_radians();
    let lambda1 = origin.lon.to_radians();

    let sin_phi2 = phi1.sin() * angular.cos() + phi1.cos() * angular.sin() * theta.cos();
    let phi2 = sin_phi2.clamp(-1.0, 1.0).asin();
    let y = theta.sin() * angular.sin() * phi1.cos();
    let x = angular.cos() - phi1.sin() * phi2.sin();
    let lambda2 = lambda1 + y.atan2(x);

    LatLon::new(phi2.to_degrees(), normalize_longitude(lambda2.to_degrees()))
}

/// Great-circle distance between two points in metres (haversine).
pub fn haversine_m(a: LatLon, b: LatLon) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lon - a.lon).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().clamp(0.0, 1.0).asin();

    EARTH_RADIUS_M * c
}

/// Initial bearing from `a` to `b` in `[0, 360)`.
pub fn initial_bearing(a: LatLon, b: LatLon) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_lambda = (b.lon - a.lon).to_radians();

    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();

    normalize_bearing(y.atan2(x).to_degrees())
}

/// Sum of great-circle distances between consecutive points, in metres.
///
/// Empty and single-point sequences measure zero.
pub fn accumulate_distance(points: &[LatLon]) -> f64 {
    points
        .iter()
        .zip(points.iter().skip(1))
        .map(|(a, b)| haversine_m(*a, *b))
        .sum()
}

/// Ground-projected field-of-view triangle `[origin, left edge, right edge]`.
///
/// The edges lie at `azimuth - fov/2` and `azimuth + fov/2`, each wrapped
/// into `[0, 360)`, and reach `range_m` from the origin.
pub fn fov_cone(
    origin: LatLon,
    azimuth_deg: f64,
    fov_deg: f64,
    range_m: f64,
) -> Result<[LatLon; 3], GeoError> {
    if !origin.is_known() {
        return Err(GeoError::UnknownPosition(origin));
    }
    check_finite("azimuth", azimuth_deg)?;
    check_non_negative("field of view", fov_deg)?;
    check_non_negative("range", range_m)?;

    let half = fov_deg / 2.0;
    let left = destination(
        origin,
        normalize_bearing(azimuth_deg - half),
        range_m,
        DistanceUnit::Meters,
    );
    let right = destination(
        origin,
        normalize_bearing(azimuth_deg + half),
        range_m,
        DistanceUnit::Meters,
    );

    Ok([origin, left, right])
}

fn check_finite(name: &'static str, value: f64) -> Result<(), GeoError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GeoError::InvalidParameter { name, value })
    }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<(), GeoError> {
    check_finite(name, value)?;
    if value < 0.0 {
        return Err(GeoError::InvalidParameter { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: LatLon = LatLon::new(38.9, -77.0);

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn bearings_wrap_into_range() {
        assert!(close(normalize_bearing(-90.0), 270.0, 1e-12));
        assert!(close(normalize_bearing(360.0), 0.0, 1e-12));
        assert!(close(normalize_bearing(725.0), 5.0, 1e-9));
        assert!(normalize_bearing(-1e-20) < 360.0);
    }

    #[test]
    fn cardinal_bearings_move_in_expected_direction() {
        for distance in [1.0, 100.0, 25_000.0] {
            let n = destination(ORIGIN, 0.0, distance, DistanceUnit::Meters);
            assert!(n.lat > ORIGIN.lat);
            assert!(close(n.lon, ORIGIN.lon, 1e-9));

            let e = destination(ORIGIN, 90.0, distance, DistanceUnit::Meters);
            assert!(e.lon > ORIGIN.lon);

            let s = destination(ORIGIN, 180.0, distance, DistanceUnit::Meters);
            assert!(s.lat < ORIGIN.lat);
            assert!(close(s.lon, ORIGIN.lon, 1e-9));

            let w = destination(ORIGIN, 270.0, distance, DistanceUnit::Meters);
            assert!(w.lon < ORIGIN.lon);
        }
    }

    #[test]
    fn destination_respects_units() {
        let km = destination(ORIGIN, 45.0, 1.0, DistanceUnit::Kilometers);
        let m = destination(ORIGIN, 45.0, 1000.0, DistanceUnit::Meters);
        assert!(close(km.lat, m.lat, 1e-12));
        assert!(close(km.lon, m.lon, 1e-12));
    }

    #[test]
    fn destination_and_haversine_agree() {
        let p = destination(ORIGIN, 123.0, 5_000.0, DistanceUnit::Meters);
        assert!(close(haversine_m(ORIGIN, p), 5_000.0, 1e-6));
        assert!(close(initial_bearing(ORIGIN, p), 123.0, 1e-6));
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_m(LatLon::new(0.0, 0.0), LatLon::new(1.0, 0.0));
        assert!(close(d, 111_195.0, 5.0));
    }

    #[test]
    fn destination_wraps_antimeridian() {
        let p = destination(LatLon::new(0.0, 179.999), 90.0, 1_000.0, DistanceUnit::Meters);
        assert!(p.lon < 0.0);
        assert!(p.is_known());
    }

    #[test]
    fn accumulated_distance_is_monotonic() {
        assert!(close(accumulate_distance(&[]), 0.0, 0.0));
        assert!(close(accumulate_distance(&[ORIGIN]), 0.0, 0.0));

        let mut points = vec![ORIGIN];
        let mut last = 0.0;
        for bearing in [10.0, 200.0, 90.0, 90.0, 315.0] {
            let tail = points.last().copied().unwrap_or(ORIGIN);
            points.push(destination(tail, bearing, 750.0, DistanceUnit::Meters));
            let total = accumulate_distance(&points);
            assert!(total >= last);
            last = total;
        }
        assert!(close(last, 3_750.0, 1e-6));
    }

    #[test]
    fn cone_edges_straddle_azimuth() {
        let cone = fov_cone(ORIGIN, 0.0, 60.0, 100.0);
        assert!(cone.is_ok());
        let [origin, left, right] = cone.unwrap_or([ORIGIN; 3]);
        assert_eq!(origin, ORIGIN);
        assert!(close(initial_bearing(ORIGIN, left), 330.0, 1e-6));
        assert!(close(initial_bearing(ORIGIN, right), 30.0, 1e-6));
        assert!(close(haversine_m(ORIGIN, left), 100.0, 1e-6));
    }

    #[test]
    fn cone_rejects_bad_input() {
        let unknown = LatLon::new(999.0, 999.0);
        assert!(matches!(
            fov_cone(unknown, 0.0, 60.0, 100.0),
            Err(GeoError::UnknownPosition(_))
        ));
        assert!(matches!(
            fov_cone(ORIGIN, f64::NAN, 60.0, 100.0),
            Err(GeoError::InvalidParameter { name: "azimuth", .. })
        ));
        assert!(matches!(
            fov_cone(ORIGIN, 0.0, 60.0, -1.0),
            Err(GeoError::InvalidParameter { name: "range", .. })
        ));
    }
}
