//! In-memory transport for driving the protocol stack in tests.
//!
//! The mock serves reads from a byte queue scripted in advance and
//! records every written byte, which is enough to exercise the full
//! request/response path deterministically: the protocol is strictly
//! half-duplex, so a scripted reply stream pairs naturally with the
//! requests that precede it.

use std::collections::VecDeque;
use std::time::Duration;

use crate::{Transport, TransportError};

/// Scripted in-memory transport.
#[derive(Debug, Default)]
pub struct MockTransport {
    reads: VecDeque<u8>,
    written: Vec<u8>,
    reset_pending: bool,
    reboot_on_wait: bool,
}

impl MockTransport {
    /// Create an empty mock.
    pub fn new() -> Self {
        MockTransport::default()
    }

    /// Append bytes to the read queue.
    pub fn queue_bytes(&mut self, data: &[u8]) {
        self.reads.extend(data.iter().copied());
    }

    /// All bytes written so far.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Bytes still queued for reading.
    pub fn queued(&self) -> usize {
        self.reads.len()
    }

    /// Make the next write fail with [`TransportError::DeviceRebooted`],
    /// as if a reset event had been observed on the port.
    pub fn inject_reset(&mut self) {
        self.reset_pending = true;
    }

    /// Make the next [`Transport::wait_for_reboot`] report a reset.
    pub fn announce_reboot(&mut self) {
        self.reboot_on_wait = true;
    }
}

impl Transport for MockTransport {
    fn write(&mut self, data: &[u8], _timeout: Duration) -> Result<usize, TransportError> {
        if self.reset_pending {
            self.reset_pending = false;
            return Err(TransportError::DeviceRebooted);
        }
        self.written.extend_from_slice(data);
        Ok(data.len())
    }

    fn read(&mut self, len: usize, _timeout: Duration) -> Result<Vec<u8>, TransportError> {
        if len == 0 {
            return Ok(Vec::new());
        }
        let available = self.reads.len().min(len);
        if available == 0 {
            return Err(TransportError::NothingRead { requested: len });
        }
        let chunk: Vec<u8> = self.reads.drain(..available).collect();
        if chunk.len() != len {
            return Err(TransportError::ShortRead {
                requested: len,
                actual: chunk.len(),
            });
        }
        Ok(chunk)
    }

    fn wait_for_reboot(&mut self, _timeout: Duration) -> Result<bool, TransportError> {
        Ok(std::mem::take(&mut self.reboot_on_wait))
    }
}
