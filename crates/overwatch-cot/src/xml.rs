//! CoT XML writer and reader.
//!
//! The writer is hand-rolled so attribute order is fixed and the output is
//! byte-for-byte deterministic. The reader is a `quick-xml` pull parser and
//! accepts any well-formed document with the same elements, regardless of
//! attribute order or whitespace.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use overwatch_types::{
    CotContact, CotDetail, CotEvent, CotLink, CotPoint, RfSignalDetail, SensorDetail,
};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::CotError;

/// CoT schema version written on every event.
pub const COT_VERSION: &str = "2.0";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Display adapter that writes a [`CotEvent`] as an XML document.
pub struct CotXml<'a>(pub &'a CotEvent);

/// Escape an attribute value.
///
/// Tab, newline and carriage return become character references so that
/// attribute-value normalisation in the receiving parser keeps them.
fn escape(raw: &str) -> Cow<'_, str> {
    escape_xml(raw, true)
}

/// Escape element text. Newlines and tabs are kept literally.
fn escape_text(raw: &str) -> Cow<'_, str> {
    escape_xml(raw, false)
}

const fn needs_escape(c: char, attribute: bool) -> bool {
    match c {
        '&' | '<' | '>' | '"' | '\'' | '\r' => true,
        '\t' | '\n' => attribute,
        c => c < ' ',
    }
}

/// XML 1.0 forbids the remaining C0 controls even as character
/// references; they are written as U+FFFD.
fn escape_xml(raw: &str, attribute: bool) -> Cow<'_, str> {
    if !raw.chars().any(|c| needs_escape(c, attribute)) {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len().saturating_add(16));
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\r' => out.push_str("&#13;"),
            '\t' if attribute => out.push_str("&#9;"),
            '\n' if attribute => out.push_str("&#10;"),
            '\t' | '\n' => out.push(c),
            c if c < ' ' => out.push(char::REPLACEMENT_CHARACTER),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl fmt::Display for CotXml<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ev = self.0;
        writeln!(f, "{XML_DECLARATION}")?;
        writeln!(
            f,
            r#"<event version="{COT_VERSION}" uid="{}" type="{}" how="{}" time="{}" start="{}" stale="{}">"#,
            escape(&ev.uid),
            escape(&ev.cot_type),
            escape(&ev.how),
            timestamp(&ev.time),
            timestamp(&ev.start),
            timestamp(&ev.stale),
        )?;

        let p = &ev.point;
        writeln!(
            f,
            r#"  <point lat="{}" lon="{}" hae="{}" ce="{}" le="{}" />"#,
            p.lat, p.lon, p.hae, p.ce, p.le
        )?;

        writeln!(f, "  <detail>")?;
        let d = &ev.detail;
        if let Some(contact) = &d.contact {
            writeln!(f, r#"    <contact callsign="{}" />"#, escape(&contact.callsign))?;
        }
        if let Some(remarks) = &d.remarks {
            writeln!(f, "    <remarks>{}</remarks>", escape_text(remarks))?;
        }
        if let Some(rf) = &d.rf_signal {
            write!(
                f,
                r#"    <rf_signal frequency_mhz="{}" power_dbm="{}" bandwidth_khz="{}" signal_type="{}" classification="{}" confidence="{}""#,
                rf.frequency_mhz,
                rf.power_dbm,
                rf.bandwidth_khz,
                escape(&rf.signal_type),
                escape(&rf.classification),
                rf.confidence,
            )?;
            if let Some(modulation) = &rf.modulation {
                write!(f, r#" modulation="{}""#, escape(modulation))?;
            }
            if let Some(snr) = rf.snr_db {
                write!(f, r#" snr_db="{snr}""#)?;
            }
            writeln!(f, " />")?;
        }
        if let Some(sensor) = &d.sensor {
            write!(f, "    <sensor ")?;
            let attrs = [
                ("fov", sensor.fov),
                ("range", sensor.range),
                ("azimuth", sensor.azimuth),
                ("elevation", sensor.elevation),
            ];
            for (name, value) in attrs {
                if let Some(v) = value {
                    write!(f, r#"{name}="{v}" "#)?;
                }
            }
            writeln!(f, "/>")?;
        }
        for link in &d.links {
            writeln!(
                f,
                r#"    <link uid="{}" relation="{}" type="{}" />"#,
                escape(&link.uid),
                escape(&link.relation),
                escape(&link.link_type),
            )?;
        }
        writeln!(f, "  </detail>")?;
        write!(f, "</event>")
    }
}

/// Serialize an event to its XML wire form.
///
/// Attribute order is fixed, free text is escaped, and optional elements
/// and attributes are omitted rather than written empty.
pub fn to_xml(event: &CotEvent) -> String {
    CotXml(event).to_string()
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Attributes of one element, unescaped.
struct Attrs {
    element: &'static str,
    values: BTreeMap<String, String>,
}

impl Attrs {
    fn read(element: &'static str, start: &BytesStart<'_>) -> Result<Self, CotError> {
        let mut values = BTreeMap::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(quick_xml::Error::from)?
                .into_owned();
            values.insert(key, value);
        }
        Ok(Self { element, values })
    }

    fn optional(&self, attribute: &str) -> Option<&str> {
        self.values.get(attribute).map(String::as_str)
    }

    fn required(&self, attribute: &'static str) -> Result<&str, CotError> {
        self.optional(attribute).ok_or(CotError::MissingAttribute {
            element: self.element,
            attribute,
        })
    }

    fn string(&self, attribute: &'static str) -> Result<String, CotError> {
        self.required(attribute).map(ToOwned::to_owned)
    }

    fn number(&self, attribute: &'static str) -> Result<f64, CotError> {
        parse_number(attribute, self.required(attribute)?)
    }

    fn optional_number(&self, attribute: &'static str) -> Result<Option<f64>, CotError> {
        self.optional(attribute)
            .map(|raw| parse_number(attribute, raw))
            .transpose()
    }

    fn time(&self, attribute: &'static str) -> Result<DateTime<Utc>, CotError> {
        let raw = self.required(attribute)?;
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| CotError::InvalidTimestamp {
                attribute,
                value: raw.to_owned(),
            })
    }
}

fn parse_number(attribute: &'static str, raw: &str) -> Result<f64, CotError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| CotError::InvalidNumber {
            attribute,
            value: raw.to_owned(),
        })
}

struct EventHeader {
    uid: String,
    cot_type: String,
    how: String,
    time: DateTime<Utc>,
    start: DateTime<Utc>,
    stale: DateTime<Utc>,
}

/// Incremental state while walking the document.
#[derive(Default)]
struct Builder {
    header: Option<EventHeader>,
    point: Option<CotPoint>,
    detail: CotDetail,
    remarks: Option<String>,
    in_remarks: bool,
}

impl Builder {
    fn element(&mut self, start: &BytesStart<'_>, empty: bool) -> Result<(), CotError> {
        match start.local_name().as_ref() {
            b"event" => {
                let a = Attrs::read("event", start)?;
                self.header = Some(EventHeader {
                    uid: a.string("uid")?,
                    cot_type: a.string("type")?,
                    how: a.optional("how").unwrap_or_default().to_owned(),
                    time: a.time("time")?,
                    start: a.time("start")?,
                    stale: a.time("stale")?,
                });
            }
            b"point" => {
                let a = Attrs::read("point", start)?;
                self.point = Some(CotPoint {
                    lat: a.number("lat")?,
                    lon: a.number("lon")?,
                    hae: a.optional_number("hae")?.unwrap_or(0.0),
                    ce: a.optional_number("ce")?.unwrap_or(0.0),
                    le: a.optional_number("le")?.unwrap_or(0.0),
                });
            }
            b"contact" => {
                let a = Attrs::read("contact", start)?;
                self.detail.contact = Some(CotContact {
                    callsign: a.optional("callsign").unwrap_or_default().to_owned(),
                });
            }
            b"remarks" => {
                self.remarks = Some(String::new());
                self.in_remarks = !empty;
            }
            b"rf_signal" => {
                let a = Attrs::read("rf_signal", start)?;
                self.detail.rf_signal = Some(RfSignalDetail {
                    frequency_mhz: a.number("frequency_mhz")?,
                    power_dbm: a.number("power_dbm")?,
                    bandwidth_khz: a.number("bandwidth_khz")?,
                    signal_type: a.string("signal_type")?,
                    classification: a.optional("classification").unwrap_or_default().to_owned(),
                    confidence: a.number("confidence")?,
                    modulation: a.optional("modulation").map(ToOwned::to_owned),
                    snr_db: a.optional_number("snr_db")?,
                });
            }
            b"sensor" => {
                let a = Attrs::read("sensor", start)?;
                self.detail.sensor = Some(SensorDetail {
                    fov: a.optional_number("fov")?,
                    range: a.optional_number("range")?,
                    azimuth: a.optional_number("azimuth")?,
                    elevation: a.optional_number("elevation")?,
                });
            }
            b"link" => {
                let a = Attrs::read("link", start)?;
                self.detail.links.push(CotLink {
                    uid: a.string("uid")?,
                    relation: a.optional("relation").unwrap_or_default().to_owned(),
                    link_type: a.optional("type").unwrap_or_default().to_owned(),
                });
            }
            // unknown detail extensions are ignored
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: Cow<'_, str>) {
        if self.in_remarks
            && let Some(remarks) = self.remarks.as_mut()
        {
            remarks.push_str(&text);
        }
    }

    fn finish(self) -> Result<CotEvent, CotError> {
        let header = self.header.ok_or(CotError::MissingElement("event"))?;
        let point = self.point.ok_or(CotError::MissingElement("point"))?;
        let mut detail = self.detail;
        detail.remarks = self.remarks;
        Ok(CotEvent {
            uid: header.uid,
            cot_type: header.cot_type,
            how: header.how,
            time: header.time,
            start: header.start,
            stale: header.stale,
            point,
            detail,
        })
    }
}

/// Parse a CoT XML document back into an event.
pub fn from_xml(xml: &str) -> Result<CotEvent, CotError> {
    let mut reader = Reader::from_str(xml);
    let mut builder = Builder::default();

    loop {
        match reader.read_event()? {
            Event::Start(start) => builder.element(&start, false)?,
            Event::Empty(start) => builder.element(&start, true)?,
            Event::Text(text) => builder.text(text.unescape().map_err(quick_xml::Error::from)?),
            Event::CData(data) => {
                let raw = data.into_inner();
                builder.text(String::from_utf8_lossy(&raw));
            }
            Event::End(end) => {
                if end.local_name().as_ref() == b"remarks" {
                    builder.in_remarks = false;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    builder.finish()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample() -> CotEvent {
        let time = Utc
            .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .unwrap_or_default();
        CotEvent {
            uid: "RF-s-1".to_owned(),
            cot_type: "a-u-G-E-S".to_owned(),
            how: "m-g".to_owned(),
            time,
            start: time,
            stale: time + chrono::TimeDelta::minutes(5),
            point: CotPoint {
                lat: 38.9,
                lon: -77.0,
                hae: 0.0,
                ce: 25.0,
                le: 100.0,
            },
            detail: CotDetail {
                contact: Some(CotContact {
                    callsign: "Tom & Jerry's <\"net\">".to_owned(),
                }),
                remarks: Some("line one\nline <two>".to_owned()),
                rf_signal: None,
                sensor: None,
                links: Vec::new(),
            },
        }
    }

    #[test]
    fn writes_fixed_attribute_order() {
        let xml = to_xml(&sample());
        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains(
            r#"<event version="2.0" uid="RF-s-1" type="a-u-G-E-S" how="m-g" time="2024-05-01T12:00:00.000Z" start="2024-05-01T12:00:00.000Z" stale="2024-05-01T12:05:00.000Z">"#
        ));
        assert!(xml.contains(r#"<point lat="38.9" lon="-77" hae="0" ce="25" le="100" />"#));
        assert!(xml.ends_with("</event>"));
    }

    #[test]
    fn escapes_free_text() {
        let xml = to_xml(&sample());
        assert!(xml.contains(
            r#"callsign="Tom &amp; Jerry&apos;s &lt;&quot;net&quot;&gt;""#
        ));
        assert!(xml.contains("<remarks>line one\nline &lt;two&gt;</remarks>"));
    }

    #[test]
    fn attribute_whitespace_becomes_character_references() {
        assert_eq!(escape("LTE\tBand 12\nlikely\r"), "LTE&#9;Band 12&#10;likely&#13;");
        assert_eq!(escape_text("one\ttwo\nthree\r"), "one\ttwo\nthree&#13;");
        assert!(matches!(escape("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn forbidden_controls_are_replaced() {
        assert_eq!(escape("a\u{1}b\u{1b}c"), "a\u{fffd}b\u{fffd}c");
        assert_eq!(escape_text("bell\u{7}"), "bell\u{fffd}");
    }

    #[test]
    fn omits_absent_blocks() {
        let xml = to_xml(&sample());
        assert!(!xml.contains("<rf_signal"));
        assert!(!xml.contains("<sensor"));
        assert!(!xml.contains("<link"));
    }

    #[test]
    fn sensor_writes_only_present_attributes() {
        let mut ev = sample();
        ev.detail.sensor = Some(SensorDetail {
            fov: Some(360.0),
            range: Some(10_000.0),
            azimuth: None,
            elevation: None,
        });
        assert!(to_xml(&ev).contains(r#"<sensor fov="360" range="10000" />"#));
    }

    #[test]
    fn reads_back_what_it_writes() {
        let ev = sample();
        let parsed = from_xml(&to_xml(&ev));
        assert_eq!(parsed.ok(), Some(ev));
    }

    #[test]
    fn reader_tolerates_reordered_attributes() {
        let xml = r#"<event stale="2024-05-01T12:05:00Z" start="2024-05-01T12:00:00Z" time="2024-05-01T12:00:00Z" how="h-e" type="a-f-G" uid="x"><point le="1" ce="2" hae="3" lon="4" lat="5"/><detail><__group name="Cyan"/></detail></event>"#;
        let ev = from_xml(xml);
        assert!(ev.as_ref().is_ok_and(|e| e.uid == "x" && (e.point.lat - 5.0).abs() < f64::EPSILON));
        assert!(ev.is_ok_and(|e| e.detail == CotDetail::default()));
    }

    #[test]
    fn reader_reports_missing_parts() {
        assert!(matches!(from_xml("<detail/>"), Err(CotError::MissingElement("event"))));
        let no_point = r#"<event uid="x" type="t" time="2024-05-01T12:00:00Z" start="2024-05-01T12:00:00Z" stale="2024-05-01T12:05:00Z"></event>"#;
        assert!(matches!(from_xml(no_point), Err(CotError::MissingElement("point"))));
        let no_uid = r#"<event type="t" time="2024-05-01T12:00:00Z" start="2024-05-01T12:00:00Z" stale="2024-05-01T12:05:00Z"/>"#;
        assert!(matches!(
            from_xml(no_uid),
            Err(CotError::MissingAttribute { element: "event", attribute: "uid" })
        ));
    }

    #[test]
    fn reader_reports_bad_values() {
        let bad_time = r#"<event uid="x" type="t" time="noon" start="2024-05-01T12:00:00Z" stale="2024-05-01T12:05:00Z"/>"#;
        assert!(matches!(from_xml(bad_time), Err(CotError::InvalidTimestamp { attribute: "time", .. })));
        let bad_lat = r#"<event uid="x" type="t" time="2024-05-01T12:00:00Z" start="2024-05-01T12:00:00Z" stale="2024-05-01T12:05:00Z"><point lat="north" lon="1"/></event>"#;
        assert!(matches!(from_xml(bad_lat), Err(CotError::InvalidNumber { attribute: "lat", .. })));
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(matches!(
            from_xml("<detail><remarks></detail>"),
            Err(CotError::Xml(_))
        ));
    }
}
