//! USB CDC serial transport.

use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use notify::event::ModifyKind;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serialport::{ClearBuffer, SerialPort};

use crate::{Transport, TransportError};

/// Baud rate the device's CDC interface runs at.
pub const BAUD_RATE: u32 = 115_200;

/// Interval between open attempts while the port is absent.
const OPEN_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// A connection to the device over its USB CDC serial port.
///
/// Owns the port handle and a filesystem watcher on the port's device
/// node. A metadata change on the node means the device re-enumerated,
/// which is how resets are observed out of band.
pub struct CdcTransport {
    port: Box<dyn SerialPort>,
    port_name: String,
    resets: mpsc::Receiver<notify::Result<notify::Event>>,
    // Keeps the watch alive for the lifetime of the connection.
    _watcher: RecommendedWatcher,
}

impl CdcTransport {
    /// Open the port, retrying at 1-second intervals until `open_timeout`
    /// elapses.
    ///
    /// The input buffer is flushed after a successful open so a stale
    /// reply from a previous session cannot be paired with the next
    /// request.
    pub fn open(port_name: &str, open_timeout: Duration) -> Result<Self, TransportError> {
        let deadline = Instant::now() + open_timeout;
        let port = loop {
            match serialport::new(port_name, BAUD_RATE)
                .timeout(OPEN_RETRY_INTERVAL)
                .open()
            {
                Ok(port) => break port,
                Err(err) => {
                    if Instant::now() >= deadline {
                        log::error!("port {port_name} not found: {err}");
                        return Err(TransportError::DeviceNotFound {
                            port: port_name.to_string(),
                            waited: open_timeout,
                        });
                    }
                    log::warn!("can't open {port_name}, retrying...");
                    thread::sleep(OPEN_RETRY_INTERVAL);
                }
            }
        };
        port.clear(ClearBuffer::Input)?;
        log::info!("opened port {port_name}");

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx)?;
        watcher.watch(Path::new(port_name), RecursiveMode::NonRecursive)?;

        Ok(CdcTransport {
            port,
            port_name: port_name.to_string(),
            resets: rx,
            _watcher: watcher,
        })
    }

    /// Name of the underlying port.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Drain the watcher channel, failing if a reset event is pending.
    fn check_reset(&mut self) -> Result<(), TransportError> {
        loop {
            match self.resets.try_recv() {
                Ok(event) => {
                    if is_reset_event(&event?) {
                        log::debug!("attribute change on {}", self.port_name);
                        return Err(TransportError::DeviceRebooted);
                    }
                }
                Err(mpsc::TryRecvError::Empty) | Err(mpsc::TryRecvError::Disconnected) => {
                    return Ok(())
                }
            }
        }
    }
}

impl Drop for CdcTransport {
    fn drop(&mut self) {
        log::info!("closing port {}", self.port_name);
    }
}

/// A device reset shows up as a metadata (attribute) change on the port
/// device node.
fn is_reset_event(event: &notify::Event) -> bool {
    matches!(event.kind, EventKind::Modify(ModifyKind::Metadata(_)))
}

impl Transport for CdcTransport {
    fn write(&mut self, data: &[u8], timeout: Duration) -> Result<usize, TransportError> {
        self.check_reset()?;
        self.port.set_timeout(timeout)?;
        let mut written = 0;
        while written < data.len() {
            match self.port.write(&data[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(err) if err.kind() == io::ErrorKind::TimedOut => break,
                Err(err) => return Err(err.into()),
            }
        }
        if written != data.len() {
            return Err(TransportError::ShortWrite {
                requested: data.len(),
                actual: written,
            });
        }
        self.port.flush()?;
        Ok(written)
    }

    fn read(&mut self, len: usize, timeout: Duration) -> Result<Vec<u8>, TransportError> {
        if len == 0 {
            return Ok(Vec::new());
        }
        self.port.set_timeout(timeout)?;
        let mut buf = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            match self.port.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == io::ErrorKind::TimedOut => break,
                Err(err) => return Err(err.into()),
            }
        }
        if filled == 0 {
            return Err(TransportError::NothingRead { requested: len });
        }
        if filled != len {
            return Err(TransportError::ShortRead {
                requested: len,
                actual: filled,
            });
        }
        Ok(buf)
    }

    fn wait_for_reboot(&mut self, timeout: Duration) -> Result<bool, TransportError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(false);
            }
            match self.resets.recv_timeout(remaining) {
                Ok(event) => {
                    if is_reset_event(&event?) {
                        log::debug!("reboot event on {}", self.port_name);
                        return Ok(true);
                    }
                }
                Err(mpsc::RecvTimeoutError::Timeout)
                | Err(mpsc::RecvTimeoutError::Disconnected) => return Ok(false),
            }
        }
    }
}
