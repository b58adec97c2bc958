//! Detection and sensor encoders.
//!
//! Both encoders are pure: the same input (and, for sensors, the same
//! `now`) always yields the same [`CotEvent`].

use std::fmt::Write as _;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use overwatch_types::{
    CotContact, CotDetail, CotEvent, CotLink, CotPoint, RfDetection, RfSignalDetail,
    SensorDescriptor, SensorDetail,
};

use crate::signal_table::{SENSOR_COT_TYPE, signal_type_to_cot_type};

/// `how` value for machine-generated events.
pub const HOW_MACHINE_GENERATED: &str = "m-g";

/// Lifetime of a detection event in minutes.
pub const DETECTION_TTL_MINUTES: i64 = 5;

/// Lifetime of a sensor event in minutes.
pub const SENSOR_TTL_MINUTES: i64 = 30;

/// Circular error of an RF fix in metres.
pub const DETECTION_CE_M: f64 = 25.0;

/// Linear error of an RF fix in metres.
pub const DETECTION_LE_M: f64 = 100.0;

/// Circular and linear error of a surveyed sensor in metres.
pub const SENSOR_ERROR_M: f64 = 10.0;

/// Field of view written for a bearing-only detection.
pub const DETECTION_FOV_DEG: f64 = 15.0;

/// Range written for a bearing-only detection.
pub const DETECTION_RANGE_M: f64 = 5_000.0;

/// Field of view of an omnidirectional sensor.
pub const SENSOR_FOV_DEG: f64 = 360.0;

/// Detection range of a sensor.
pub const SENSOR_RANGE_M: f64 = 10_000.0;

/// Link relation from a detection to its sensor (parent to child).
pub const PARENT_CHILD_RELATION: &str = "p-p";

/// Number of sensor id characters carried in a detection uid.
const UID_SENSOR_PREFIX_CHARS: usize = 8;

/// `time + minutes`, saturating at the end of representable time.
fn stale_after(time: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    time.checked_add_signed(TimeDelta::minutes(minutes))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Deterministic uid for a detection.
///
/// `RF-{first 8 chars of sensor id}-{frequency in Hz}-{epoch millis}`. The
/// full-precision frequency keeps two detections that differ only in
/// frequency from colliding.
pub fn detection_uid(detection: &RfDetection) -> String {
    let prefix: String = detection
        .sensor_id
        .as_str()
        .chars()
        .take(UID_SENSOR_PREFIX_CHARS)
        .collect();
    format!(
        "RF-{prefix}-{}-{}",
        detection.frequency_hz,
        detection.timestamp.timestamp_millis()
    )
}

/// Round to `decimals` places with ties away from zero, the way the
/// dashboard's readouts did, before handing the value to `format!`.
fn readout(value: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    (value * scale).round() / scale
}

/// Multi-line human-readable summary of a detection.
pub fn detection_remarks(detection: &RfDetection) -> String {
    let mut remarks = format!(
        "RF Detection: {}\nFrequency: {:.3} MHz\nPower: {:.1} dBm\nBandwidth: {:.1} kHz\nClassification: {}\nConfidence: {:.0}%\nSensor: {}",
        detection.signal_type,
        readout(detection.frequency_mhz(), 3),
        readout(detection.power_dbm, 1),
        readout(detection.bandwidth_khz(), 1),
        detection.classification,
        readout(detection.confidence * 100.0, 0),
        detection.sensor_name,
    );
    if let Some(bearing) = detection.bearing {
        let _ = write!(remarks, "\nBearing: {:.0}°", readout(bearing, 0));
    }
    remarks
}

/// Build the CoT event for an RF detection.
///
/// Times are truncated to milliseconds, the precision of the wire form.
/// The stale time is five minutes after the detection.
pub fn encode_detection(detection: &RfDetection) -> CotEvent {
    let time = detection.timestamp.trunc_subsecs(3);
    let metadata = detection.metadata.as_ref();

    let rf_signal = RfSignalDetail {
        frequency_mhz: detection.frequency_mhz(),
        power_dbm: detection.power_dbm,
        bandwidth_khz: detection.bandwidth_khz(),
        signal_type: detection.signal_type.clone(),
        classification: detection.classification.clone(),
        confidence: detection.confidence,
        modulation: metadata
            .and_then(|m| m.modulation.clone())
            .filter(|m| !m.is_empty()),
        snr_db: metadata.and_then(|m| m.snr_db),
    };

    let links = if detection.sensor_id.is_empty() {
        Vec::new()
    } else {
        vec![CotLink {
            uid: detection.sensor_id.to_string(),
            relation: PARENT_CHILD_RELATION.to_owned(),
            link_type: SENSOR_COT_TYPE.to_owned(),
        }]
    };

    let sensor = detection.bearing.map(|bearing| SensorDetail {
        fov: Some(DETECTION_FOV_DEG),
        range: Some(DETECTION_RANGE_M),
        azimuth: Some(bearing),
        elevation: None,
    });

    CotEvent {
        uid: detection_uid(detection),
        cot_type: signal_type_to_cot_type(&detection.signal_type).to_owned(),
        how: HOW_MACHINE_GENERATED.to_owned(),
        time,
        start: time,
        stale: stale_after(time, DETECTION_TTL_MINUTES),
        point: CotPoint {
            lat: detection.location.lat,
            lon: detection.location.lon,
            hae: detection.location.alt.unwrap_or(0.0),
            ce: DETECTION_CE_M,
            le: DETECTION_LE_M,
        },
        detail: CotDetail {
            contact: Some(CotContact {
                callsign: format!(
                    "{} {:.1}MHz",
                    detection.signal_type,
                    readout(detection.frequency_mhz(), 1)
                ),
            }),
            remarks: Some(detection_remarks(detection)),
            rf_signal: Some(rf_signal),
            sensor,
            links,
        },
    }
}

/// Build the persistent CoT event for a deployed sensor as of `now`.
pub fn encode_sensor(sensor: &SensorDescriptor, now: DateTime<Utc>) -> CotEvent {
    let time = now.trunc_subsecs(3);

    let mut remarks = format!(
        "RF Sensor\nStatus: {}\nCapability: RF Detection & Classification",
        sensor.status
    );
    if let Some(range) = sensor.frequency_range {
        let _ = write!(
            remarks,
            "\nCoverage: {:.3}-{:.3} MHz",
            range.min_hz / 1e6,
            range.max_hz / 1e6
        );
    }

    CotEvent {
        uid: sensor.id.to_string(),
        cot_type: SENSOR_COT_TYPE.to_owned(),
        how: HOW_MACHINE_GENERATED.to_owned(),
        time,
        start: time,
        stale: stale_after(time, SENSOR_TTL_MINUTES),
        point: CotPoint {
            lat: sensor.location.lat,
            lon: sensor.location.lon,
            hae: sensor.location.alt.unwrap_or(0.0),
            ce: SENSOR_ERROR_M,
            le: SENSOR_ERROR_M,
        },
        detail: CotDetail {
            contact: Some(CotContact {
                callsign: sensor.name.clone(),
            }),
            remarks: Some(remarks),
            rf_signal: None,
            sensor: Some(SensorDetail {
                fov: Some(SENSOR_FOV_DEG),
                range: Some(SENSOR_RANGE_M),
                azimuth: None,
                elevation: None,
            }),
            links: Vec::new(),
        },
    }
}

/// [`encode_sensor`] at the current wall-clock time.
pub fn encode_sensor_now(sensor: &SensorDescriptor) -> CotEvent {
    encode_sensor(sensor, Utc::now())
}
