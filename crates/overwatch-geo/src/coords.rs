//! Human-readable coordinate readouts.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Readout style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum CoordinateFormat {
    /// Decimal degrees, six places.
    #[default]
    Dd,
    /// Degrees, minutes, seconds with a hemisphere letter.
    Dms,
}

/// A formatted latitude/longitude pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FormattedCoordinate {
    /// Latitude text.
    pub lat: String,
    /// Longitude text.
    pub lon: String,
}

/// Format a coordinate pair for display.
pub fn format_coordinate(lat: f64, lon: f64, format: CoordinateFormat) -> FormattedCoordinate {
    match format {
        CoordinateFormat::Dd => FormattedCoordinate {
            lat: format!("{lat:.6}°"),
            lon: format!("{lon:.6}°"),
        },
        CoordinateFormat::Dms => FormattedCoordinate {
            lat: to_dms(lat, if lat >= 0.0 { 'N' } else { 'S' }),
            lon: to_dms(lon, if lon >= 0.0 { 'E' } else { 'W' }),
        },
    }
}

fn to_dms(decimal: f64, hemisphere: char) -> String {
    let absolute = decimal.abs();
    let degrees = absolute.floor();
    let minutes_f = (absolute - degrees) * 60.0;
    let minutes = minutes_f.floor();
    let seconds = (minutes_f - minutes) * 60.0;
    format!("{degrees}° {minutes}' {seconds:.2}\" {hemisphere}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_degrees() {
        let c = format_coordinate(38.9, -77.036_5, CoordinateFormat::Dd);
        assert_eq!(c.lat, "38.900000°");
        assert_eq!(c.lon, "-77.036500°");
    }

    #[test]
    fn degrees_minutes_seconds() {
        let c = format_coordinate(38.897_7, -77.036_5, CoordinateFormat::Dms);
        assert_eq!(c.lat, "38° 53' 51.72\" N");
        assert_eq!(c.lon, "77° 2' 11.40\" W");
    }

    #[test]
    fn southern_hemisphere() {
        let c = format_coordinate(-27.5, 153.0, CoordinateFormat::Dms);
        assert_eq!(c.lat, "27° 30' 0.00\" S");
        assert_eq!(c.lon, "153° 0' 0.00\" E");
    }
}
