//! Restore endpoint: restoring device state from stored backups.

use serde_json::{json, Value};

use cdclink_protocol::{Endpoint, Method};
use cdclink_transport::Transport;

use crate::api::backup::{parse_task_status, TaskStatus};
use crate::reply::require_typed;
use crate::{ClientError, Session};

/// List the backup files available to restore from.
pub fn list_backups<T: Transport>(session: &mut Session<T>) -> Result<Vec<Value>, ClientError> {
    let response = session.execute(
        Endpoint::Restore,
        Method::Get,
        json!({"request": "fileList"}),
    )?;
    require_typed(&response, "files")
}

/// Start restoring from the backup identified by `id`.
pub fn start_restore<T: Transport>(
    session: &mut Session<T>,
    id: &str,
) -> Result<TaskStatus, ClientError> {
    let response = session.execute(Endpoint::Restore, Method::Post, json!({"restore": id}))?;
    parse_task_status(&response)
}

/// Poll the state of a restore task.
pub fn get_restore_state<T: Transport>(
    session: &mut Session<T>,
    id: &str,
) -> Result<TaskStatus, ClientError> {
    let response = session.execute(Endpoint::Restore, Method::Get, json!({"id": id}))?;
    parse_task_status(&response)
}
