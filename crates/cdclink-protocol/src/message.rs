//! Message model for the endpoint protocol.
//!
//! Requests and responses are JSON objects addressed to a numbered
//! endpoint with an HTTP-like method. Replies carry a numeric status:
//! codes below 400 are the success family, 400 and above the error
//! family.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;

/// Logical endpoints exposed by the device firmware.
///
/// The numeric codes are a stable contract with the firmware and must
/// never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Endpoint {
    /// Device information and diagnostics.
    DeviceInfo = 1,
    /// System update and reboot control.
    Update = 2,
    /// Filesystem access (chunked file transfer).
    Filesystem = 3,
    /// Backup tasks.
    Backup = 4,
    /// Restore tasks.
    Restore = 5,
    /// Factory reset.
    Factory = 6,
    /// Contacts database.
    Contacts = 7,
    /// Messages and threads.
    Messages = 8,
    /// Call log database.
    CallLog = 9,
    /// Calendar events.
    Events = 10,
    /// Developer mode: UI introspection, key injection, AT passthrough.
    DeveloperMode = 11,
    /// Bluetooth control.
    Bluetooth = 12,
    /// USB security (phone lock).
    UsbSecurity = 13,
}

impl Endpoint {
    /// Get the numeric wire code for this endpoint.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<Endpoint> for u8 {
    fn from(endpoint: Endpoint) -> Self {
        endpoint as u8
    }
}

impl TryFrom<u8> for Endpoint {
    type Error = DecodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Endpoint::DeviceInfo),
            2 => Ok(Endpoint::Update),
            3 => Ok(Endpoint::Filesystem),
            4 => Ok(Endpoint::Backup),
            5 => Ok(Endpoint::Restore),
            6 => Ok(Endpoint::Factory),
            7 => Ok(Endpoint::Contacts),
            8 => Ok(Endpoint::Messages),
            9 => Ok(Endpoint::CallLog),
            10 => Ok(Endpoint::Events),
            11 => Ok(Endpoint::DeveloperMode),
            12 => Ok(Endpoint::Bluetooth),
            13 => Ok(Endpoint::UsbSecurity),
            other => Err(DecodeError::UnknownEndpoint(other)),
        }
    }
}

/// Request methods, with HTTP-like semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Method {
    /// Read data.
    Get = 1,
    /// Create data.
    Post = 2,
    /// Modify data.
    Put = 3,
    /// Remove data.
    Delete = 4,
}

impl From<Method> for u8 {
    fn from(method: Method) -> Self {
        method as u8
    }
}

impl TryFrom<u8> for Method {
    type Error = DecodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Method::Get),
            2 => Ok(Method::Post),
            3 => Ok(Method::Put),
            4 => Ok(Method::Delete),
            other => Err(DecodeError::UnknownMethod(other)),
        }
    }
}

/// Statuses the firmware attaches to replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum Status {
    /// Request succeeded.
    Ok = 200,
    /// Request accepted, work continues asynchronously.
    Accepted = 202,
    /// Request succeeded with nothing to return.
    NoContent = 204,
    /// Result lives elsewhere.
    SeeOther = 303,
    /// Request was malformed.
    BadRequest = 400,
    /// Endpoint refused the request (e.g. security lock engaged).
    Forbidden = 403,
    /// Addressed entity does not exist.
    NotFound = 404,
    /// Endpoint handler not ready to serve the request.
    NotAcceptable = 406,
    /// Firmware-side failure.
    InternalServerError = 500,
    /// Operation not implemented by this firmware.
    NotImplemented = 501,
}

impl Status {
    /// Get the numeric wire code for this status.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Whether this status belongs to the success family (code < 400).
    pub fn is_success(self) -> bool {
        self.code() < 400
    }
}

impl From<Status> for u16 {
    fn from(status: Status) -> Self {
        status as u16
    }
}

impl TryFrom<u16> for Status {
    type Error = DecodeError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            200 => Ok(Status::Ok),
            202 => Ok(Status::Accepted),
            204 => Ok(Status::NoContent),
            303 => Ok(Status::SeeOther),
            400 => Ok(Status::BadRequest),
            403 => Ok(Status::Forbidden),
            404 => Ok(Status::NotFound),
            406 => Ok(Status::NotAcceptable),
            500 => Ok(Status::InternalServerError),
            501 => Ok(Status::NotImplemented),
            other => Err(DecodeError::UnknownStatus(other)),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Ok => "OK",
            Status::Accepted => "Accepted",
            Status::NoContent => "No Content",
            Status::SeeOther => "See Other",
            Status::BadRequest => "Bad Request",
            Status::Forbidden => "Forbidden",
            Status::NotFound => "Not Found",
            Status::NotAcceptable => "Not Acceptable",
            Status::InternalServerError => "Internal Server Error",
            Status::NotImplemented => "Not Implemented",
        };
        write!(f, "{} {}", self.code(), name)
    }
}

/// A host→device request message.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// Addressed endpoint.
    pub endpoint: Endpoint,
    /// Request method.
    pub method: Method,
    /// Correlation id, echoed back by the firmware.
    pub uuid: u32,
    /// Endpoint-specific body; the wire payload is open-ended per endpoint.
    pub body: Value,
}

impl Request {
    /// Build a request.
    pub fn new(endpoint: Endpoint, method: Method, uuid: u32, body: Value) -> Self {
        Request {
            endpoint,
            method,
            uuid,
            body,
        }
    }

    /// Serialize into a frame payload.
    pub fn to_payload(&self) -> Result<Vec<u8>, DecodeError> {
        serde_json::to_vec(self).map_err(DecodeError::Json)
    }
}

/// A device→host reply message.
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// Endpoint the reply originates from.
    pub endpoint: Endpoint,
    /// Outcome status.
    pub status: Status,
    /// Correlation id echoed from the request.
    #[serde(default)]
    pub uuid: u32,
    /// Endpoint-specific body.
    #[serde(default)]
    pub body: Value,
}

impl Response {
    /// Parse a reply from a frame payload.
    pub fn from_payload(payload: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(payload).map_err(DecodeError::Json)
    }

    /// Diagnostic `reason` field that error replies may carry.
    pub fn reason(&self) -> Option<&str> {
        self.body.get("reason").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_codes_stable() {
        // The numeric contract with the firmware.
        let codes = [
            (Endpoint::DeviceInfo, 1),
            (Endpoint::Update, 2),
            (Endpoint::Filesystem, 3),
            (Endpoint::Backup, 4),
            (Endpoint::Restore, 5),
            (Endpoint::Factory, 6),
            (Endpoint::Contacts, 7),
            (Endpoint::Messages, 8),
            (Endpoint::CallLog, 9),
            (Endpoint::Events, 10),
            (Endpoint::DeveloperMode, 11),
            (Endpoint::Bluetooth, 12),
            (Endpoint::UsbSecurity, 13),
        ];
        for (endpoint, code) in codes {
            assert_eq!(endpoint.code(), code);
            assert_eq!(Endpoint::try_from(code).expect("known code"), endpoint);
        }
    }

    #[test]
    fn test_unknown_codes_rejected() {
        assert!(Endpoint::try_from(14).is_err());
        assert!(Method::try_from(5).is_err());
        assert!(Status::try_from(418).is_err());
    }

    #[test]
    fn test_request_wire_shape() {
        let request = Request::new(
            Endpoint::Filesystem,
            Method::Get,
            42,
            json!({"fileName": "/sys/user/data.log"}),
        );
        let encoded: Value =
            serde_json::from_slice(&request.to_payload().expect("should serialize"))
                .expect("valid JSON");
        assert_eq!(
            encoded,
            json!({
                "endpoint": 3,
                "method": 1,
                "uuid": 42,
                "body": {"fileName": "/sys/user/data.log"}
            })
        );
    }

    #[test]
    fn test_response_parse() {
        let payload = br#"{"endpoint":11,"status":200,"uuid":7,"body":{"focus":"ApplicationDesktop"}}"#;
        let response = Response::from_payload(payload).expect("should parse");
        assert_eq!(response.endpoint, Endpoint::DeveloperMode);
        assert_eq!(response.status, Status::Ok);
        assert_eq!(response.uuid, 7);
        assert_eq!(response.body["focus"], "ApplicationDesktop");
    }

    #[test]
    fn test_response_reason() {
        let payload = br#"{"endpoint":3,"status":404,"uuid":9,"body":{"reason":"not found"}}"#;
        let response = Response::from_payload(payload).expect("should parse");
        assert_eq!(response.status, Status::NotFound);
        assert_eq!(response.reason(), Some("not found"));
    }

    #[test]
    fn test_response_body_defaults() {
        let payload = br#"{"endpoint":1,"status":204,"uuid":3}"#;
        let response = Response::from_payload(payload).expect("should parse");
        assert_eq!(response.status, Status::NoContent);
        assert!(response.body.is_null());
        assert_eq!(response.reason(), None);
    }

    #[test]
    fn test_status_families() {
        for status in [Status::Ok, Status::Accepted, Status::NoContent, Status::SeeOther] {
            assert!(status.is_success(), "{status} should be success family");
        }
        for status in [
            Status::BadRequest,
            Status::Forbidden,
            Status::NotFound,
            Status::NotAcceptable,
            Status::InternalServerError,
            Status::NotImplemented,
        ] {
            assert!(!status.is_success(), "{status} should be error family");
        }
    }
}
