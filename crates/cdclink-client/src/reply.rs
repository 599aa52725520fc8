//! Helpers for pulling typed data out of reply bodies.

use serde::de::DeserializeOwned;
use serde_json::Value;

use cdclink_protocol::{DecodeError, Response};

use crate::ClientError;

/// Deserialize a reply body into a typed record, validating required
/// fields at the boundary.
pub(crate) fn parse_body<R: DeserializeOwned>(response: &Response) -> Result<R, ClientError> {
    serde_json::from_value(response.body.clone())
        .map_err(|err| ClientError::Decode(DecodeError::Json(err)))
}

/// Fetch a required field from a reply body.
pub(crate) fn require_field<'a>(
    response: &'a Response,
    field: &'static str,
) -> Result<&'a Value, ClientError> {
    response
        .body
        .get(field)
        .ok_or(ClientError::MissingField { field })
}

/// Fetch and deserialize a required field from a reply body.
pub(crate) fn require_typed<R: DeserializeOwned>(
    response: &Response,
    field: &'static str,
) -> Result<R, ClientError> {
    let value = require_field(response, field)?;
    serde_json::from_value(value.clone())
        .map_err(|err| ClientError::Decode(DecodeError::Json(err)))
}
