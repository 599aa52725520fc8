//! Transport error types.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by the serial transport.
///
/// Short reads and writes are transmission errors: fatal for the current
/// transaction, though the connection itself may still be usable.
/// [`TransportError::DeviceRebooted`] means the device re-enumerated
/// underneath us; anything in flight is lost.
#[derive(Error, Debug)]
pub enum TransportError {
    /// No device answered on the port within the open timeout.
    #[error("no device at {port} after {waited:?}")]
    DeviceNotFound {
        /// Port (or discovery filter) that was tried.
        port: String,
        /// How long we kept retrying.
        waited: Duration,
    },

    /// The port accepted fewer bytes than requested before the write
    /// timeout.
    #[error("short write: accepted {actual} of {requested} bytes")]
    ShortWrite {
        /// Bytes requested to write.
        requested: usize,
        /// Bytes actually accepted.
        actual: usize,
    },

    /// Nothing arrived before the read timeout.
    #[error("nothing read of requested {requested} bytes")]
    NothingRead {
        /// Bytes requested to read.
        requested: usize,
    },

    /// Fewer bytes arrived than requested before the read timeout.
    #[error("short read: received {actual} of {requested} bytes")]
    ShortRead {
        /// Bytes requested to read.
        requested: usize,
        /// Bytes actually received.
        actual: usize,
    },

    /// An out-of-band reset event was observed on the port.
    #[error("device rebooted")]
    DeviceRebooted,

    /// Serial port layer failure.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Port watcher failure.
    #[error("port watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Raw I/O failure on the port.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
