//! Client error types.

use thiserror::Error;

use cdclink_protocol::{DecodeError, FramingError, Status};
use cdclink_transport::TransportError;

use crate::dom::DomError;

/// Errors surfaced by the client.
///
/// Everything propagates to the immediate caller; nothing is swallowed
/// inside the protocol core, and no automatic reconnect lives here.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Frame layer failure. The connection has lost sync and is
    /// unusable.
    #[error(transparent)]
    Framing(#[from] FramingError),

    /// Byte-level transport failure (short read/write, device reset,
    /// port errors).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Reply payload failed to decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The device answered with an error status.
    #[error("device returned {status}: {}", .reason.as_deref().unwrap_or("no reason given"))]
    Transaction {
        /// Status carried by the reply.
        status: Status,
        /// Diagnostic `reason` field from the reply body, if present.
        reason: Option<String>,
    },

    /// A reply body lacks a field the operation requires.
    #[error("required field {field:?} missing from reply body")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },

    /// The device supplied transfer parameters no transfer can run with.
    #[error("invalid transfer parameters: {0}")]
    InvalidTransfer(String),

    /// A completed transfer did not produce the declared byte count.
    #[error("transfer produced {actual} bytes, device declared {expected}")]
    SizeMismatch {
        /// Byte count declared at transfer init.
        expected: u64,
        /// Bytes actually reconstructed.
        actual: u64,
    },

    /// CRC32 of the transferred content disagrees with the device.
    #[error("integrity mismatch: device crc32 {expected}, computed {actual}")]
    IntegrityMismatch {
        /// CRC32 the device reported, as 8-digit hex.
        expected: String,
        /// CRC32 computed over the received bytes, as 8-digit hex.
        actual: String,
    },

    /// A chunk payload was not valid base64.
    #[error("chunk payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// UI snapshot parsing or traversal failure.
    #[error(transparent)]
    Dom(#[from] DomError),

    /// Local file I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
