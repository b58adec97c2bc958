//! Cursor-on-Target codec for RF detections and sensors.
//!
//! Detections and sensor descriptors are encoded into a canonical
//! [`CotEvent`](overwatch_types::CotEvent), which is then written to (and
//! read back from) the XML wire form accepted by TAK-compatible servers.
//!
//! # Modules
//!
//! - [`signal_table`] -- The closed signal type to CoT type table
//! - [`encode`] -- Detection and sensor encoders
//! - [`xml`] -- Deterministic writer and `quick-xml` reader
//! - [`error`] -- Error types

pub mod encode;
pub mod error;
pub mod signal_table;
pub mod xml;

pub use encode::{
    detection_remarks, detection_uid, encode_detection, encode_sensor, encode_sensor_now,
};
pub use error::CotError;
pub use signal_table::{DEFAULT_COT_TYPE, SENSOR_COT_TYPE, signal_type_to_cot_type};
pub use xml::{CotXml, from_xml, to_xml};
