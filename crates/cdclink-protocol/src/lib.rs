//! USB CDC Endpoint Protocol
//!
//! This crate provides the wire format for talking to the device firmware
//! over its USB CDC serial interface. The protocol is request/response:
//! the host sends a JSON message addressed to a numbered endpoint, the
//! firmware answers with a JSON message carrying an HTTP-like status.
//!
//! # Protocol Overview
//!
//! Every message travels in a length-prefixed frame (see [`frame`]):
//!
//! - **Requests** (host → firmware): `{"endpoint": <int>, "method": <int>,
//!   "uuid": <int>, "body": {...}}`
//! - **Responses** (firmware → host): the same shape plus a numeric
//!   `"status"` field
//!
//! The `uuid` is a correlation id chosen by the host; the firmware echoes
//! it back in the reply.
//!
//! # Example
//!
//! ```rust,ignore
//! use cdclink_protocol::{frame, Endpoint, Method, Request};
//!
//! // Build a request and frame it for transmission
//! let request = Request::new(Endpoint::DeviceInfo, Method::Get, 17, serde_json::json!({}));
//! let framed = frame::encode(&request.to_payload()?)?;
//!
//! // Parse a reply payload
//! let response = cdclink_protocol::Response::from_payload(&received)?;
//! ```

mod error;
pub mod frame;
mod message;

pub use error::*;
pub use message::*;
