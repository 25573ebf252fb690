//! Error types for the mkoba_sms library.
//!
//! [`Error`] covers problems that stop an operation (unreadable input, a
//! failed write, a field that cannot be normalized). [`ParseFailure`] is the
//! recoverable, per-message outcome the batch aggregator folds into its
//! statistics.

use crate::types::{MessageShape, RawMessage};
use serde::Serialize;
use std::io;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during reading, normalization and export.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred during read or write operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error writing CSV output.
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error reading an SMS backup document.
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// Invalid date substring.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Invalid time substring.
    #[error("Invalid time: {0}")]
    InvalidTime(String),

    /// Invalid amount substring.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Missing required field.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Invalid input format specified.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// General parsing error.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlError(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlError(err.to_string())
    }
}

/// Why a single message produced no [`ParsedTransaction`](crate::types::ParsedTransaction).
///
/// Every variant keeps the original message so a report can show the raw body
/// next to the reason.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ParseFailure {
    /// The body matched none of the shape detectors.
    #[error("unrecognized message from {}", .message.source_address)]
    Unrecognized { message: RawMessage },

    /// The shape was detected but a required field could not be captured.
    #[error("classified as {shape} but fields unextractable: {reason}")]
    Extraction {
        message: RawMessage,
        shape: MessageShape,
        reason: String,
    },

    /// A captured amount, date or time failed canonicalization.
    #[error("classified as {shape} but field `{field}` is invalid: {reason}")]
    Normalization {
        message: RawMessage,
        shape: MessageShape,
        field: &'static str,
        reason: String,
    },
}

impl ParseFailure {
    /// The message this failure was produced for.
    pub fn message(&self) -> &RawMessage {
        match self {
            ParseFailure::Unrecognized { message }
            | ParseFailure::Extraction { message, .. }
            | ParseFailure::Normalization { message, .. } => message,
        }
    }

    /// Shape assigned by the classifier (`Unrecognized` for classification failures).
    pub fn shape(&self) -> MessageShape {
        match self {
            ParseFailure::Unrecognized { .. } => MessageShape::Unrecognized,
            ParseFailure::Extraction { shape, .. } | ParseFailure::Normalization { shape, .. } => {
                *shape
            }
        }
    }

    /// Whether the message failed classification rather than extraction.
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, ParseFailure::Unrecognized { .. })
    }

    /// Short status label used in exports.
    pub fn status(&self) -> &'static str {
        match self {
            ParseFailure::Unrecognized { .. } => "unrecognized",
            ParseFailure::Extraction { .. } => "extraction_failed",
            ParseFailure::Normalization { .. } => "normalization_failed",
        }
    }

    /// Human-readable reason without the message body.
    pub fn reason(&self) -> String {
        match self {
            ParseFailure::Unrecognized { .. } => "matches no known message shape".to_string(),
            ParseFailure::Extraction { reason, .. } => reason.clone(),
            ParseFailure::Normalization { field, reason, .. } => format!("{}: {}", field, reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> RawMessage {
        RawMessage::new("hello", "M-KOBA", 0)
    }

    #[test]
    fn test_failure_accessors() {
        let failure = ParseFailure::Normalization {
            message: message(),
            shape: MessageShape::MemberTransaction,
            field: "date",
            reason: "Invalid date: 31/02/2025".into(),
        };
        assert_eq!(failure.shape(), MessageShape::MemberTransaction);
        assert_eq!(failure.status(), "normalization_failed");
        assert_eq!(failure.reason(), "date: Invalid date: 31/02/2025");
        assert_eq!(failure.message().body, "hello");
        assert!(!failure.is_unrecognized());
    }

    #[test]
    fn test_unrecognized_display() {
        let failure = ParseFailure::Unrecognized { message: message() };
        assert!(failure.is_unrecognized());
        assert_eq!(failure.shape(), MessageShape::Unrecognized);
        assert_eq!(failure.to_string(), "unrecognized message from M-KOBA");
    }
}
