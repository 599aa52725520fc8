//! Host-side client for the USB CDC endpoint protocol.
//!
//! This crate turns the raw byte stream owned by [`cdclink_transport`]
//! into matched request/response pairs and layers the higher protocol
//! surfaces on top:
//!
//! - [`Session`]: the transaction engine. Build a typed request, frame
//!   it, write it, block for the matching reply, validate the status.
//! - [`transfer`]: chunked file transfer in both directions with CRC32
//!   integrity verification and progress reporting.
//! - [`dom`]: parsing and querying of the UI-state snapshot tree the
//!   developer-mode endpoint returns.
//! - [`api`]: typed wrappers for the individual firmware endpoints.
//!
//! # Example
//!
//! ```rust,ignore
//! use cdclink_client::{api, Session};
//! use cdclink_transport::CdcTransport;
//! use std::time::Duration;
//!
//! let transport = CdcTransport::open("/dev/ttyACM0", Duration::from_secs(10))?;
//! let mut session = Session::new(transport);
//! let info = api::device_info::get_device_info(&mut session)?;
//! ```

pub mod api;
pub mod dom;
mod error;
mod reply;
mod retry;
mod session;
pub mod transfer;

pub use error::*;
pub use retry::*;
pub use session::*;

pub use cdclink_protocol::{Endpoint, Method, Status};
