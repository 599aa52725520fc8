//! Backup endpoint: long-running backup tasks.
//!
//! Starting a backup returns a task id; progress is polled with further
//! requests until the task reports finished or error.

use serde::Deserialize;
use serde_json::json;

use cdclink_protocol::{Endpoint, Method, Response};
use cdclink_transport::Transport;

use crate::reply::parse_body;
use crate::{ClientError, Session};

/// State of a backup/restore task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    /// Task still in progress.
    Running,
    /// Task completed successfully.
    Finished,
    /// Task failed; the firmware's diagnostic comes along.
    Error {
        /// Failure description from the firmware.
        reason: String,
    },
    /// A state string this client does not know.
    Other(String),
}

/// A task id with its reported state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatus {
    /// Task identifier assigned by the firmware.
    pub id: String,
    /// Reported state.
    pub state: TaskState,
}

#[derive(Debug, Deserialize)]
struct TaskReply {
    id: String,
    state: String,
    #[serde(default)]
    reason: Option<String>,
}

pub(crate) fn parse_task_status(response: &Response) -> Result<TaskStatus, ClientError> {
    let reply: TaskReply = parse_body(response)?;
    let state = match reply.state.as_str() {
        "running" => TaskState::Running,
        "finished" => TaskState::Finished,
        "error" => TaskState::Error {
            reason: reply.reason.unwrap_or_default(),
        },
        other => TaskState::Other(other.to_string()),
    };
    Ok(TaskStatus {
        id: reply.id,
        state,
    })
}

/// Start a backup task.
pub fn start_backup<T: Transport>(session: &mut Session<T>) -> Result<TaskStatus, ClientError> {
    let response = session.execute(Endpoint::Backup, Method::Post, json!({}))?;
    parse_task_status(&response)
}

/// Poll the state of a backup task.
pub fn get_backup_state<T: Transport>(
    session: &mut Session<T>,
    id: &str,
) -> Result<TaskStatus, ClientError> {
    let response = session.execute(Endpoint::Backup, Method::Get, json!({"id": id}))?;
    parse_task_status(&response)
}
