//! Messages endpoint: SMS threads and messages.
//!
//! Requests carry a `category` discriminator selecting the thread or
//! message table. Entry shapes vary across firmware revisions and are
//! handed back as raw JSON.

use serde::Deserialize;
use serde_json::{json, Value};

use cdclink_protocol::{Endpoint, Method};
use cdclink_transport::Transport;

use crate::reply::{parse_body, require_typed};
use crate::{ClientError, Session};

/// One page of a paged listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    /// Entries in this page.
    pub entries: Vec<Value>,
    /// Total number of entries in the table.
    #[serde(rename = "totalCount")]
    pub total_count: u64,
    /// Offset token for the next page, when more entries exist.
    #[serde(rename = "nextPage", default)]
    pub next_page: Option<Value>,
}

/// Fetch one page of message threads.
pub fn thread_page<T: Transport>(
    session: &mut Session<T>,
    offset: u64,
    limit: u64,
) -> Result<Page, ClientError> {
    let response = session.execute(
        Endpoint::Messages,
        Method::Get,
        json!({"category": "thread", "offset": offset, "limit": limit}),
    )?;
    parse_body(&response)
}

/// Fetch a thread by id.
pub fn thread_by_id<T: Transport>(
    session: &mut Session<T>,
    thread_id: u64,
) -> Result<Value, ClientError> {
    let response = session.execute(
        Endpoint::Messages,
        Method::Get,
        json!({"category": "thread", "threadID": thread_id}),
    )?;
    Ok(response.body)
}

/// Mark a thread read or unread.
pub fn mark_thread_unread<T: Transport>(
    session: &mut Session<T>,
    thread_id: u64,
    unread: bool,
) -> Result<(), ClientError> {
    session.execute(
        Endpoint::Messages,
        Method::Get,
        json!({"category": "thread", "threadID": thread_id, "isUnread": unread}),
    )?;
    Ok(())
}

/// Delete a thread by id.
pub fn delete_thread<T: Transport>(
    session: &mut Session<T>,
    thread_id: u64,
) -> Result<(), ClientError> {
    session.execute(
        Endpoint::Messages,
        Method::Delete,
        json!({"category": "thread", "threadID": thread_id}),
    )?;
    Ok(())
}

/// Number of messages across all threads.
pub fn message_count<T: Transport>(session: &mut Session<T>) -> Result<u64, ClientError> {
    let response = session.execute(
        Endpoint::Messages,
        Method::Get,
        json!({"category": "message", "count": true}),
    )?;
    require_typed(&response, "count")
}

/// Fetch one page of messages.
pub fn message_page<T: Transport>(
    session: &mut Session<T>,
    offset: u64,
    limit: u64,
) -> Result<Page, ClientError> {
    let response = session.execute(
        Endpoint::Messages,
        Method::Get,
        json!({"category": "message", "offset": offset, "limit": limit}),
    )?;
    parse_body(&response)
}
