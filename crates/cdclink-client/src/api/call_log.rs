//! Call log endpoint.

use serde::Deserialize;
use serde_json::{json, Value};

use cdclink_protocol::{Endpoint, Method};
use cdclink_transport::Transport;

use crate::reply::{parse_body, require_typed};
use crate::{ClientError, Session};

/// One page of the call log.
#[derive(Debug, Clone, Deserialize)]
pub struct CallLogPage {
    /// Entries in this page.
    pub entries: Vec<Value>,
    /// Total number of call log entries.
    #[serde(rename = "totalCount")]
    pub total_count: u64,
}

/// Number of call log entries.
pub fn count<T: Transport>(session: &mut Session<T>) -> Result<u64, ClientError> {
    let response = session.execute(Endpoint::CallLog, Method::Get, json!({"count": true}))?;
    require_typed(&response, "count")
}

/// Fetch one page of the call log.
pub fn page<T: Transport>(
    session: &mut Session<T>,
    offset: u64,
    limit: u64,
) -> Result<CallLogPage, ClientError> {
    let response = session.execute(
        Endpoint::CallLog,
        Method::Get,
        json!({"offset": offset, "limit": limit}),
    )?;
    parse_body(&response)
}

/// Fetch a call log entry by id.
pub fn by_id<T: Transport>(session: &mut Session<T>, id: u64) -> Result<Value, ClientError> {
    let response = session.execute(Endpoint::CallLog, Method::Get, json!({"id": id}))?;
    Ok(response.body)
}
