//! Error types for the `overwatch-cot` crate.
//!
//! Encoding never fails; only parsing an XML document does.

/// Errors that can occur while reading a CoT XML document.
#[derive(Debug, thiserror::Error)]
pub enum CotError {
    /// The document is not well-formed XML.
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A required element is absent.
    #[error("missing <{0}> element")]
    MissingElement(&'static str),

    /// A required attribute is absent from an element.
    #[error("missing attribute {attribute} on <{element}>")]
    MissingAttribute {
        /// Element name.
        element: &'static str,
        /// Attribute name.
        attribute: &'static str,
    },

    /// A numeric attribute did not parse.
    #[error("attribute {attribute} is not a number: {value:?}")]
    InvalidNumber {
        /// Attribute name.
        attribute: &'static str,
        /// Raw value.
        value: String,
    },

    /// A timestamp attribute is not ISO-8601.
    #[error("attribute {attribute} is not an ISO-8601 timestamp: {value:?}")]
    InvalidTimestamp {
        /// Attribute name.
        attribute: &'static str,
        /// Raw value.
        value: String,
    },
}
