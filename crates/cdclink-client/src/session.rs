//! Transaction engine: one request, one matched reply.
//!
//! ```text
//! caller ──▶ Session::execute ──▶ frame::encode ──▶ Transport::write
//!                                                        │
//! caller ◀── validated Response ◀── frame decode ◀── Transport::read
//! ```
//!
//! The protocol permits exactly one outstanding transaction per
//! connection. `execute` takes `&mut self`, so a second transaction
//! cannot begin before the first completes or fails. The precondition
//! is enforced at compile time rather than queued silently.

use std::time::{Duration, Instant};

use rand::Rng;
use serde_json::Value;

use cdclink_protocol::{frame, Endpoint, FramingError, Method, Request, Response};
use cdclink_transport::{Transport, TransportError};

use crate::{ClientError, RetryPolicy};

/// Correlation ids are drawn uniformly from this range.
pub const UUID_RANGE: std::ops::RangeInclusive<u32> = 1..=32_000;

/// Timeouts governing a session's transactions.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Bound on writing one request frame.
    pub write_timeout: Duration,
    /// Bound on each read while waiting for the reply frame.
    pub read_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            write_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(30),
        }
    }
}

/// Durations of the two halves of the last completed exchange, kept for
/// diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct TransactionTiming {
    /// Time spent writing the request frame.
    pub send: Duration,
    /// Time spent waiting for and reading the reply frame.
    pub read: Duration,
}

/// A protocol session over one connection.
pub struct Session<T: Transport> {
    transport: T,
    config: SessionConfig,
    last_timing: Option<TransactionTiming>,
}

impl<T: Transport> Session<T> {
    /// Create a session with default timeouts.
    pub fn new(transport: T) -> Self {
        Session::with_config(transport, SessionConfig::default())
    }

    /// Create a session with explicit timeouts.
    pub fn with_config(transport: T, config: SessionConfig) -> Self {
        Session {
            transport,
            config,
            last_timing: None,
        }
    }

    /// Access the underlying transport, e.g. to wait out a requested
    /// reboot.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Timing of the last completed exchange.
    pub fn last_timing(&self) -> Option<TransactionTiming> {
        self.last_timing
    }

    /// Run one transaction with no retry.
    pub fn execute(
        &mut self,
        endpoint: Endpoint,
        method: Method,
        body: Value,
    ) -> Result<Response, ClientError> {
        self.execute_with_policy(endpoint, method, body, &RetryPolicy::none())
    }

    /// Run one transaction, re-issuing it for error statuses the policy
    /// declares transient.
    ///
    /// Only error *statuses* are ever retried; transport and framing
    /// failures propagate immediately regardless of policy.
    pub fn execute_with_policy(
        &mut self,
        endpoint: Endpoint,
        method: Method,
        body: Value,
        policy: &RetryPolicy,
    ) -> Result<Response, ClientError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.transact(endpoint, method, body.clone()) {
                Err(ClientError::Transaction { status, .. })
                    if policy.should_retry(attempt, status) =>
                {
                    log::debug!(
                        "{endpoint:?} {method:?} returned {status}, retrying (attempt {attempt})"
                    );
                }
                other => return other,
            }
        }
    }

    fn transact(
        &mut self,
        endpoint: Endpoint,
        method: Method,
        body: Value,
    ) -> Result<Response, ClientError> {
        let uuid = rand::thread_rng().gen_range(UUID_RANGE);
        let request = Request::new(endpoint, method, uuid, body);
        let framed = frame::encode(&request.to_payload()?)?;

        let write_started = Instant::now();
        self.transport.write(&framed, self.config.write_timeout)?;
        let send = write_started.elapsed();

        let read_started = Instant::now();
        let payload = self.read_frame()?;
        let read = read_started.elapsed();
        self.last_timing = Some(TransactionTiming { send, read });

        let response = Response::from_payload(&payload)?;
        if response.uuid != uuid {
            // Old firmware revisions do not echo the uuid; the reply is
            // then paired with the request by ordering alone.
            log::warn!("uuid mismatch: sent {uuid}, reply carries {}", response.uuid);
        }
        log::trace!(
            "{endpoint:?} {method:?} -> {} ({} byte reply)",
            response.status,
            payload.len()
        );
        if !response.status.is_success() {
            return Err(ClientError::Transaction {
                status: response.status,
                reason: response.reason().map(str::to_string),
            });
        }
        Ok(response)
    }

    /// Toggle the CDC echo mode the firmware offers for line debugging.
    ///
    /// This is the one exchange that bypasses framing: the command goes
    /// out as a bare string and the firmware echoes it back verbatim
    /// when the toggle took effect.
    pub fn set_echo_mode(&mut self, enabled: bool) -> Result<bool, ClientError> {
        let command: &[u8] = if enabled {
            b"UsbCdcEcho=ON"
        } else {
            b"UsbCdcEcho=OFF"
        };
        self.transport.write(command, self.config.write_timeout)?;
        let echoed = self.transport.read(command.len(), self.config.read_timeout)?;
        Ok(echoed == command)
    }

    /// Read one frame: the fixed-width header, then exactly the declared
    /// payload. A short payload is a framing error, not a transient
    /// transmission problem: the stream has no resynchronization point.
    fn read_frame(&mut self) -> Result<Vec<u8>, ClientError> {
        let header = self.transport.read(frame::HEADER_LEN, self.config.read_timeout)?;
        let declared = frame::parse_header(&header)?;
        match self.transport.read(declared, self.config.read_timeout) {
            Ok(payload) => Ok(payload),
            Err(TransportError::NothingRead { .. }) => {
                Err(FramingError::PayloadTooShort { declared, actual: 0 }.into())
            }
            Err(TransportError::ShortRead { actual, .. }) => {
                Err(FramingError::PayloadTooShort { declared, actual }.into())
            }
            Err(other) => Err(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdclink_protocol::Status;
    use cdclink_transport::mock::MockTransport;
    use serde_json::json;

    /// Frame a scripted device reply.
    fn reply_frame(endpoint: u8, status: u16, body: Value) -> Vec<u8> {
        let payload = serde_json::to_vec(&json!({
            "endpoint": endpoint,
            "status": status,
            "uuid": 1,
            "body": body,
        }))
        .expect("valid JSON");
        frame::encode(&payload).expect("payload fits the length field")
    }

    /// Parse every request frame written to the mock.
    fn written_requests(mock: &MockTransport) -> Vec<Value> {
        let mut requests = Vec::new();
        let mut rest = mock.written();
        while !rest.is_empty() {
            let declared = frame::parse_header(&rest[..frame::HEADER_LEN]).expect("valid header");
            let payload = &rest[frame::HEADER_LEN..frame::HEADER_LEN + declared];
            requests.push(serde_json::from_slice(payload).expect("valid JSON"));
            rest = &rest[frame::HEADER_LEN + declared..];
        }
        requests
    }

    #[test]
    fn test_success_passes_body_through() {
        let mut mock = MockTransport::new();
        mock.queue_bytes(&reply_frame(1, 200, json!({"gitRevision": "abc123"})));
        let mut session = Session::new(mock);

        let response = session
            .execute(Endpoint::DeviceInfo, Method::Get, json!({}))
            .expect("should succeed");
        assert_eq!(response.status, Status::Ok);
        assert_eq!(response.body, json!({"gitRevision": "abc123"}));
        assert!(session.last_timing().is_some());
    }

    #[test]
    fn test_request_wire_shape_and_uuid_range() {
        let mut mock = MockTransport::new();
        mock.queue_bytes(&reply_frame(11, 200, json!({})));
        let mut session = Session::new(mock);

        session
            .execute(Endpoint::DeveloperMode, Method::Put, json!({"keyPressed": 10, "state": 2}))
            .expect("should succeed");

        let requests = written_requests(session.transport_mut());
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request["endpoint"], 11);
        assert_eq!(request["method"], 3);
        assert_eq!(request["body"], json!({"keyPressed": 10, "state": 2}));
        let uuid = request["uuid"].as_u64().expect("uuid is numeric");
        assert!((1..=32_000).contains(&uuid), "uuid {uuid} out of range");
    }

    #[test]
    fn test_error_status_raises_with_reason() {
        let mut mock = MockTransport::new();
        mock.queue_bytes(&reply_frame(3, 404, json!({"reason": "not found"})));
        let mut session = Session::new(mock);

        let err = session
            .execute(Endpoint::Filesystem, Method::Get, json!({"fileName": "/nope"}))
            .unwrap_err();
        match err {
            ClientError::Transaction { status, reason } => {
                assert_eq!(status, Status::NotFound);
                assert_eq!(reason.as_deref(), Some("not found"));
            }
            other => panic!("expected transaction error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_status_not_retried_by_default() {
        let mut mock = MockTransport::new();
        mock.queue_bytes(&reply_frame(11, 406, json!({})));
        let mut session = Session::new(mock);

        let err = session
            .execute(Endpoint::DeveloperMode, Method::Get, json!({"ui": true}))
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Transaction {
                status: Status::NotAcceptable,
                ..
            }
        ));
        assert_eq!(written_requests(session.transport_mut()).len(), 1);
    }

    #[test]
    fn test_policy_retries_once_then_succeeds() {
        let mut mock = MockTransport::new();
        mock.queue_bytes(&reply_frame(11, 406, json!({})));
        mock.queue_bytes(&reply_frame(11, 200, json!({"dom": {}})));
        let mut session = Session::new(mock);

        let policy = RetryPolicy::retry_once_on(Status::NotAcceptable);
        let response = session
            .execute_with_policy(Endpoint::DeveloperMode, Method::Get, json!({"ui": true}), &policy)
            .expect("second attempt should succeed");
        assert_eq!(response.status, Status::Ok);
        assert_eq!(written_requests(session.transport_mut()).len(), 2);
    }

    #[test]
    fn test_policy_retry_exhaustion_propagates() {
        let mut mock = MockTransport::new();
        mock.queue_bytes(&reply_frame(11, 406, json!({})));
        mock.queue_bytes(&reply_frame(11, 406, json!({})));
        let mut session = Session::new(mock);

        let policy = RetryPolicy::retry_once_on(Status::NotAcceptable);
        let err = session
            .execute_with_policy(Endpoint::DeveloperMode, Method::Get, json!({"ui": true}), &policy)
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Transaction {
                status: Status::NotAcceptable,
                ..
            }
        ));
        assert_eq!(written_requests(session.transport_mut()).len(), 2);
    }

    #[test]
    fn test_malformed_header_is_framing_error() {
        let mut mock = MockTransport::new();
        mock.queue_bytes(b"X000000005hello");
        let mut session = Session::new(mock);

        let err = session
            .execute(Endpoint::DeviceInfo, Method::Get, json!({}))
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Framing(FramingError::BadMarker { found: b'X' })
        ));
    }

    #[test]
    fn test_short_payload_is_framing_error() {
        let mut mock = MockTransport::new();
        // Header declares 100 payload bytes; only 5 ever arrive.
        mock.queue_bytes(b"#000000100hello");
        let mut session = Session::new(mock);

        let err = session
            .execute(Endpoint::DeviceInfo, Method::Get, json!({}))
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Framing(FramingError::PayloadTooShort {
                declared: 100,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_echo_mode_confirmed_by_echo() {
        let mut mock = MockTransport::new();
        mock.queue_bytes(b"UsbCdcEcho=ON");
        let mut session = Session::new(mock);
        assert!(session.set_echo_mode(true).expect("should succeed"));
    }

    #[test]
    fn test_reset_event_aborts_transaction() {
        let mut mock = MockTransport::new();
        mock.inject_reset();
        let mut session = Session::new(mock);

        let err = session
            .execute(Endpoint::DeviceInfo, Method::Get, json!({}))
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Transport(TransportError::DeviceRebooted)
        ));
    }
}
