//! Contacts endpoint.

use serde::{Deserialize, Serialize};
use serde_json::json;

use cdclink_protocol::{DecodeError, Endpoint, Method};
use cdclink_transport::Transport;

use crate::reply::{parse_body, require_typed};
use crate::{ClientError, Session};

/// A contact record, as the firmware's contacts database stores it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactEntry {
    /// Database id; absent when creating a new contact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    /// Postal address.
    pub address: String,
    /// Alternative (last) name.
    pub alt_name: String,
    /// E-mail address.
    pub email: String,
    /// Whether calls from this contact are blocked.
    pub blocked: bool,
    /// Whether the contact is a favourite.
    pub favourite: bool,
    /// Whether the contact is an in-case-of-emergency entry.
    pub ice: bool,
    /// Phone numbers.
    pub numbers: Vec<String>,
    /// Speed-dial slot.
    pub speed_dial: String,
    /// Primary (first) name.
    pub pri_name: String,
    /// Free-form note.
    pub note: String,
}

/// One page of the contacts list.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactsPage {
    /// Entries in this page.
    pub entries: Vec<ContactEntry>,
    /// Total number of contacts in the database.
    #[serde(rename = "totalCount")]
    pub total_count: u64,
}

/// Number of contacts in the database.
pub fn count<T: Transport>(session: &mut Session<T>) -> Result<u64, ClientError> {
    let response = session.execute(Endpoint::Contacts, Method::Get, json!({"count": true}))?;
    require_typed(&response, "count")
}

/// Fetch one page of contacts.
pub fn page<T: Transport>(
    session: &mut Session<T>,
    offset: u64,
    limit: u64,
) -> Result<ContactsPage, ClientError> {
    let response = session.execute(
        Endpoint::Contacts,
        Method::Get,
        json!({"offset": offset, "limit": limit}),
    )?;
    parse_body(&response)
}

/// Fetch a single contact by database id.
pub fn by_id<T: Transport>(
    session: &mut Session<T>,
    id: u32,
) -> Result<Option<ContactEntry>, ClientError> {
    let response = session.execute(Endpoint::Contacts, Method::Get, json!({"id": id}))?;
    let page: ContactsPage = parse_body(&response)?;
    Ok(page.entries.into_iter().next())
}

/// Add a contact, returning the id the database assigned.
pub fn add<T: Transport>(
    session: &mut Session<T>,
    entry: &ContactEntry,
) -> Result<u32, ClientError> {
    let body = serde_json::to_value(entry).map_err(|err| ClientError::Decode(DecodeError::Json(err)))?;
    let response = session.execute(Endpoint::Contacts, Method::Post, body)?;
    require_typed(&response, "id")
}

/// Delete a contact by database id.
pub fn delete<T: Transport>(session: &mut Session<T>, id: u32) -> Result<(), ClientError> {
    session.execute(Endpoint::Contacts, Method::Delete, json!({"id": id}))?;
    Ok(())
}
