//! Error types for the UI helpers.

/// Result type alias for UI helper operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading layout XML or stored JSON.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A malformed attribute on an XML start tag.
    #[error("Invalid XML attribute: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    /// XML text that could not be decoded or unescaped.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// JSON that could not be parsed or converted.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A JSON value of the wrong kind.
    #[error("Expected JSON {expected}, found {found}")]
    JsonType {
        expected: &'static str,
        found: &'static str,
    },
}

impl Error {
    /// Create a JSON type mismatch error.
    pub fn json_type(expected: &'static str, found: &'static str) -> Self {
        Self::JsonType { expected, found }
    }
}
