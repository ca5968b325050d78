//! Serialization formats for handwriting records.
//!
//! Two textual formats are supported: the XML record format (the exchange
//! format for storage and transport) and a compact parenthesized form.
//! XML output is produced line by line so records are byte-stable;
//! parsing is strict and a corrupt record fails loudly.

mod sexp;
mod xml;

use thiserror::Error;

/// Errors raised while reading a serialized record.
///
/// Serialization itself is infallible; only deserialization of malformed
/// input reports errors.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("missing required attribute `{0}` on <point>")]
    MissingAttribute(&'static str),
    #[error("invalid value `{value}` for `{field}`")]
    InvalidNumber { field: String, value: String },
    #[error("unexpected element <{0}>")]
    UnexpectedElement(String),
    #[error("expected root element <{0}>")]
    MissingRoot(&'static str),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
