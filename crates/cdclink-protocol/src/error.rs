//! Protocol error types.

use thiserror::Error;

/// Errors raised while framing or de-framing the byte stream.
///
/// Framing errors are fatal for the connection: the stream offers no
/// resynchronization point, so once a header is malformed or a payload
/// arrives short there is no way to find the next frame boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FramingError {
    /// Header is not the fixed width the protocol requires.
    #[error("frame header too short: expected {expected} bytes, got {actual}")]
    HeaderTooShort {
        /// Required header width.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// First header byte is not the frame marker.
    #[error("bad frame marker: expected '#', got 0x{found:02X}")]
    BadMarker {
        /// Byte found in the marker position.
        found: u8,
    },

    /// Length field contains something other than decimal digits.
    #[error("frame length field is not decimal: {field:?}")]
    BadLengthField {
        /// The offending length field, lossily decoded.
        field: String,
    },

    /// Fewer payload bytes arrived than the header declared.
    #[error("frame payload short: header declared {declared} bytes, got {actual}")]
    PayloadTooShort {
        /// Length declared in the header.
        declared: usize,
        /// Bytes actually received.
        actual: usize,
    },

    /// Payload cannot be represented in the fixed-width length field.
    #[error("payload of {len} bytes exceeds the 9-digit length field")]
    PayloadTooLarge {
        /// Payload length requested.
        len: usize,
    },
}

/// Errors raised while decoding a frame payload into a message.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Payload is not the JSON shape the protocol requires.
    #[error("invalid message JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Endpoint code outside the stable numeric contract.
    #[error("unknown endpoint code: {0}")]
    UnknownEndpoint(u8),

    /// Method code outside GET/POST/PUT/DELETE.
    #[error("unknown method code: {0}")]
    UnknownMethod(u8),

    /// Status code the firmware is not documented to send.
    #[error("unknown status code: {0}")]
    UnknownStatus(u16),
}
