//! Frame encoding and header parsing.
//!
//! Every message travels in a length-prefixed frame:
//!
//! ```text
//! +-----+-----------------+------------------+
//! | '#' | 9 ASCII digits  | payload[0..len]  |
//! +-----+-----------------+------------------+
//! ```
//!
//! The header is fixed width: one marker byte followed by the payload
//! length as zero-padded decimal. The receiver reads exactly
//! [`HEADER_LEN`] bytes, parses the declared length, then reads exactly
//! that many payload bytes. The length field carries no checksum and the
//! stream offers no resynchronization point, so framing failures must
//! propagate to the caller as fatal for the connection.

use crate::error::FramingError;

/// Marker byte opening every frame header.
pub const FRAME_MARKER: u8 = b'#';

/// Width of the decimal length field.
pub const LENGTH_DIGITS: usize = 9;

/// Total header size: marker plus length field.
pub const HEADER_LEN: usize = 1 + LENGTH_DIGITS;

/// Largest payload the length field can declare.
pub const MAX_PAYLOAD_LEN: usize = 999_999_999;

/// Encode a payload into a framed byte vector.
pub fn encode(payload: &[u8]) -> Result<Vec<u8>, FramingError> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(FramingError::PayloadTooLarge { len: payload.len() });
    }
    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.push(FRAME_MARKER);
    buf.extend_from_slice(format!("{:0width$}", payload.len(), width = LENGTH_DIGITS).as_bytes());
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// Parse a frame header, returning the declared payload length.
pub fn parse_header(header: &[u8]) -> Result<usize, FramingError> {
    if header.len() != HEADER_LEN {
        return Err(FramingError::HeaderTooShort {
            expected: HEADER_LEN,
            actual: header.len(),
        });
    }
    if header[0] != FRAME_MARKER {
        return Err(FramingError::BadMarker { found: header[0] });
    }
    let digits = &header[1..];
    if !digits.iter().all(|b| b.is_ascii_digit()) {
        return Err(FramingError::BadLengthField {
            field: String::from_utf8_lossy(digits).into_owned(),
        });
    }
    let len = digits
        .iter()
        .fold(0usize, |acc, b| acc * 10 + usize::from(b - b'0'));
    Ok(len)
}
