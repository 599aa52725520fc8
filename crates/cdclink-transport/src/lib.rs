//! Serial transport for the USB CDC endpoint protocol.
//!
//! The device enumerates as a USB CDC ACM serial port. This crate owns
//! the physical connection: opening the port with retry, timeout-bounded
//! reads and writes, and detection of out-of-band device resets.
//!
//! Reset detection works through the filesystem: when the device reboots
//! it re-enumerates, which changes the attributes of the port's device
//! node. A [`notify`] watcher on the node turns those attribute changes
//! into reset events. A reset observed mid-transaction surfaces as
//! [`TransportError::DeviceRebooted`] and aborts the in-flight exchange;
//! [`Transport::wait_for_reboot`] turns the same signal into positive
//! confirmation that an intentional reboot request took effect.

mod cdc;
mod discovery;
mod error;
pub mod mock;

pub use cdc::*;
pub use discovery::*;
pub use error::*;

use std::time::Duration;

/// A byte-oriented duplex link with timeout-bounded operations.
///
/// Exactly one request/response exchange may be in flight at a time on a
/// link; the `&mut self` receivers make that a compile-time property for
/// anything driving the transport through this trait.
pub trait Transport {
    /// Write all of `data`, blocking up to `timeout`.
    ///
    /// Checks for a pending device-reset event first and fails with
    /// [`TransportError::DeviceRebooted`] if one was observed. Accepting
    /// fewer bytes than requested is a transmission error.
    fn write(&mut self, data: &[u8], timeout: Duration) -> Result<usize, TransportError>;

    /// Read exactly `len` bytes, blocking up to `timeout`.
    ///
    /// Yielding zero bytes when `len > 0`, or fewer than `len`, is a
    /// transmission error.
    fn read(&mut self, len: usize, timeout: Duration) -> Result<Vec<u8>, TransportError>;

    /// Block until a device-reset event arrives (`true`) or `timeout`
    /// elapses (`false`).
    fn wait_for_reboot(&mut self, timeout: Duration) -> Result<bool, TransportError>;
}
