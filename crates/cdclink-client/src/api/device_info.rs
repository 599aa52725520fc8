//! Device information endpoint.

use serde_json::{json, Value};

use cdclink_protocol::{Endpoint, Method};
use cdclink_transport::Transport;

use crate::reply::require_typed;
use crate::{ClientError, Session};

/// Categories of diagnostic files the device can list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticsCategory {
    /// System log files.
    Logs = 0,
    /// Crash dump files.
    CrashDumps = 1,
}

/// Fetch the device information record (version strings, battery,
/// storage, signal). The shape varies across firmware revisions, so the
/// body is handed back as-is.
pub fn get_device_info<T: Transport>(session: &mut Session<T>) -> Result<Value, ClientError> {
    let response = session.execute(Endpoint::DeviceInfo, Method::Get, json!({}))?;
    Ok(response.body)
}

/// List diagnostic files of the given category.
///
/// An empty reply body means no files of that category exist.
pub fn get_diagnostic_files<T: Transport>(
    session: &mut Session<T>,
    category: DiagnosticsCategory,
) -> Result<Vec<String>, ClientError> {
    let response = session.execute(
        Endpoint::DeviceInfo,
        Method::Get,
        json!({"fileList": category as u8}),
    )?;
    if response.body.is_null() {
        return Ok(Vec::new());
    }
    require_typed(&response, "files")
}
