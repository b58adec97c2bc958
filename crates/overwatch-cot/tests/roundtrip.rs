//! Encode-to-XML-and-back tests over realistic detections.

#![allow(clippy::unwrap_used)]

use chrono::{TimeDelta, TimeZone, Utc};
use overwatch_cot::{encode_detection, encode_sensor, from_xml, to_xml};
use overwatch_types::{Position, RfDetection, RfMetadata, SensorDescriptor, SensorId};

fn detection() -> RfDetection {
    RfDetection {
        sensor_id: SensorId::from("a1b2c3d4e5f6"),
        sensor_name: "Ridge & Valley <East>".to_owned(),
        timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
            + TimeDelta::microseconds(123_456),
        frequency_hz: 2_450_000_000.0,
        power_dbm: -62.3,
        bandwidth_hz: 20_000.0,
        signal_type: "WiFi 2.4GHz".to_owned(),
        classification: "Commercial \"AP\"".to_owned(),
        confidence: 0.91,
        location: Position::new(38.9, -77.0),
        bearing: Some(271.4),
        metadata: Some(RfMetadata {
            modulation: Some("OFDM".to_owned()),
            snr_db: Some(21.5),
        }),
    }
}

#[test]
fn detection_survives_the_wire() {
    let det = detection();
    let event = encode_detection(&det);
    let parsed = from_xml(&to_xml(&event)).unwrap();

    assert_eq!(parsed, event);

    let rf = parsed.detail.rf_signal.unwrap();
    assert!((rf.frequency_mhz - det.frequency_hz / 1e6).abs() < f64::EPSILON);
    assert!((rf.power_dbm - det.power_dbm).abs() < f64::EPSILON);
    assert!((rf.bandwidth_khz - det.bandwidth_hz / 1e3).abs() < f64::EPSILON);
    assert!((rf.confidence - det.confidence).abs() < f64::EPSILON);
    assert_eq!(rf.classification, det.classification);
    assert_eq!(rf.modulation.as_deref(), Some("OFDM"));
}

#[test]
fn control_whitespace_survives_a_conformant_parser() {
    let mut det = detection();
    det.classification = "LTE\tBand 12\nlikely".to_owned();
    det.metadata = Some(RfMetadata {
        modulation: Some("QAM\r64".to_owned()),
        snr_db: None,
    });
    let event = encode_detection(&det);
    let xml = to_xml(&event);

    let doc = roxmltree::Document::parse(&xml).unwrap();
    let rf = doc
        .descendants()
        .find(|n| n.has_tag_name("rf_signal"))
        .unwrap();
    assert_eq!(rf.attribute("classification"), Some("LTE\tBand 12\nlikely"));
    assert_eq!(rf.attribute("modulation"), Some("QAM\r64"));
    let remarks = doc
        .descendants()
        .find(|n| n.has_tag_name("remarks"))
        .and_then(|n| n.text());
    assert_eq!(remarks, event.detail.remarks.as_deref());

    let parsed = from_xml(&xml).unwrap();
    assert_eq!(parsed, event);
}

#[test]
fn wire_times_are_millisecond_precise() {
    let xml = to_xml(&encode_detection(&detection()));
    assert!(xml.contains(r#"time="2024-05-01T12:00:00.123Z""#));
    assert!(xml.contains(r#"stale="2024-05-01T12:05:00.123Z""#));
}

#[test]
fn reencoding_is_idempotent() {
    let a = to_xml(&encode_detection(&detection()));
    let b = to_xml(&encode_detection(&detection()));
    assert_eq!(a, b);
}

#[test]
fn detail_elements_appear_in_order() {
    let xml = to_xml(&encode_detection(&detection()));
    let pos = |needle: &str| xml.find(needle).unwrap();
    assert!(pos("<contact") < pos("<remarks>"));
    assert!(pos("<remarks>") < pos("<rf_signal"));
    assert!(pos("<rf_signal") < pos("<sensor"));
    assert!(pos("<sensor") < pos("<link"));
    assert!(xml.contains(r#"<link uid="a1b2c3d4e5f6" relation="p-p" type="a-f-G-E-S" />"#));
    assert!(xml.contains(r#"modulation="OFDM" snr_db="21.5" />"#));
}

#[test]
fn sensor_survives_the_wire() {
    let sensor = SensorDescriptor {
        id: SensorId::from("a1b2c3d4e5f6"),
        name: "Ridge".to_owned(),
        location: Position::new(38.91, -77.02),
        status: "active".to_owned(),
        frequency_range: None,
    };
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    let event = encode_sensor(&sensor, now);
    let xml = to_xml(&event);

    assert!(xml.contains(r#"stale="2024-05-01T08:30:00.000Z""#));
    assert!(!xml.contains("<rf_signal"));
    assert_eq!(from_xml(&xml).unwrap(), event);
}
