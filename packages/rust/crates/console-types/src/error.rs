//! Error types for the console data model.
//!
//! Library crates use `thiserror` for explicit error enums.

use thiserror::Error;

/// Failure to parse an execution point string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionPointError {
    /// The point string was empty.
    #[error("execution point is empty")]
    Empty,
    /// The point string contained a non-digit character.
    #[error("execution point {point:?} contains non-digit {found:?}")]
    InvalidDigit {
        /// Offending input.
        point: String,
        /// First non-digit character.
        found: char,
    },
}

/// Reasons a raw packet is refused at the ingestion boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    /// Null messages are never stored.
    #[error("null message packets are dropped")]
    NullMessage,
    /// The packet `type` is not part of the console vocabulary.
    #[error("unknown message type: {0}")]
    UnknownType(String),
    /// The packet `level` is not part of the console vocabulary.
    #[error("unknown message level: {0}")]
    UnknownLevel(String),
    /// The packet `source` is not part of the console vocabulary.
    #[error("unknown message source: {0}")]
    UnknownSource(String),
    /// The packet carried an unparsable execution point.
    #[error("invalid execution point: {0}")]
    InvalidPoint(#[from] ExecutionPointError),
    /// A field required by the packet type was absent.
    #[error("{kind} packet is missing required field `{field}`")]
    MissingField {
        /// Packet type that requires the field.
        kind: &'static str,
        /// Missing field name.
        field: &'static str,
    },
    /// The packet body did not deserialize.
    #[error("malformed packet: {0}")]
    Malformed(String),
}
