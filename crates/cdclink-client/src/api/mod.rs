//! Typed wrappers for the individual firmware endpoints.
//!
//! Each module maps one endpoint's request/response shapes onto
//! explicit types with required-field validation at the boundary. The
//! generic transaction engine underneath stays mapping-based, since the
//! wire payload really is open-ended per endpoint.

pub mod backup;
pub mod call_log;
pub mod contacts;
pub mod developer_mode;
pub mod device_info;
pub mod filesystem;
pub mod messages;
pub mod restore;
pub mod security;
pub mod update;
