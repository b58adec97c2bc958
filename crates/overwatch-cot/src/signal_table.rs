//! Signal type to CoT type code table.
//!
//! Receiving TAK systems key their icons off these codes, so the table is
//! closed: entries are exact, case-sensitive matches.

/// CoT type used for any signal type not in the table.
pub const DEFAULT_COT_TYPE: &str = "a-u-G-E-S";

/// CoT type of a deployed RF sensor.
pub const SENSOR_COT_TYPE: &str = "a-f-G-E-S";

/// Every known signal type and its CoT type code.
pub const SIGNAL_TABLE: [(&str, &str); 13] = [
    // friendly communications
    ("FM Broadcast", "a-f-G-E-V-R"),
    ("WiFi 2.4GHz", "a-f-G-E-W-C"),
    ("WiFi 5GHz", "a-f-G-E-W-C"),
    ("Bluetooth", "a-f-G-E-W-C"),
    // cellular and commercial
    ("Cellular", "a-n-G-E-C"),
    ("TV Broadcast", "a-n-G-E-V-T"),
    // tactical
    ("Tactical Radio", "a-f-G-E-V-M"),
    ("SATCOM", "a-f-G-E-S"),
    // unknown or suspicious
    ("Unknown", "a-u-G-E-S"),
    ("Jamming", "a-h-G-E-S-J"),
    // radar
    ("Radar", "a-u-G-E-S-R"),
    ("Search Radar", "a-u-G-E-S-R-S"),
    ("Track Radar", "a-u-G-E-S-R-T"),
];

/// Look up the CoT type for a signal type, falling back to
/// [`DEFAULT_COT_TYPE`].
pub fn signal_type_to_cot_type(signal_type: &str) -> &'static str {
    SIGNAL_TABLE
        .iter()
        .find(|(name, _)| *name == signal_type)
        .map_or(DEFAULT_COT_TYPE, |&(_, code)| code)
}
