//! Developer mode endpoint: UI introspection and test hooks.
//!
//! This endpoint is the QA surface of the firmware: it injects key
//! presses, answers questions about the UI state, proxies AT commands
//! to the modem, and dumps the current window tree for the [`crate::dom`]
//! engine.

use serde_json::{json, Value};

use cdclink_protocol::{Endpoint, Method, Status};
use cdclink_transport::Transport;

use crate::dom::DomNode;
use crate::reply::{require_field, require_typed};
use crate::{ClientError, RetryPolicy, Session};

/// Key codes understood by the firmware's input pipeline.
pub mod key_codes {
    /// Navigation left.
    pub const LEFT: u32 = b'a' as u32;
    /// Navigation right.
    pub const RIGHT: u32 = b'd' as u32;
    /// Navigation up.
    pub const UP: u32 = b'w' as u32;
    /// Navigation down.
    pub const DOWN: u32 = b's' as u32;
    /// Center/confirm key.
    pub const ENTER: u32 = b'\n' as u32;
    /// Left function key.
    pub const FN_LEFT: u32 = 11;
    /// Right function key (back/home).
    pub const FN_RIGHT: u32 = 12;
    /// Volume up.
    pub const VOL_UP: u32 = 13;
    /// Volume down.
    pub const VOL_DOWN: u32 = 14;
    /// Torch button.
    pub const TORCH: u32 = 15;
    /// Mode slider, top position.
    pub const SLIDER_UP: u32 = 16;
    /// Mode slider, bottom position.
    pub const SLIDER_DOWN: u32 = 17;
    /// Mode slider, middle position.
    pub const SLIDER_MID: u32 = 18;
    /// Hash key.
    pub const HASH: u32 = b'#' as u32;
    /// Star key.
    pub const STAR: u32 = b'*' as u32;
}

/// Key press duration classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    /// Ordinary tap.
    Short,
    /// Held key (e.g. lock, power menu).
    Long,
}

impl KeyPress {
    // Input state codes of the firmware's key event pipeline.
    fn state(self) -> u8 {
        match self {
            KeyPress::Short => 2,
            KeyPress::Long => 4,
        }
    }
}

/// Inject one key press.
pub fn send_key<T: Transport>(
    session: &mut Session<T>,
    key_code: u32,
    press: KeyPress,
) -> Result<(), ClientError> {
    session.execute(
        Endpoint::DeveloperMode,
        Method::Put,
        json!({"keyPressed": key_code, "state": press.state()}),
    )?;
    Ok(())
}

/// Name of the application currently holding focus.
pub fn focused_application<T: Transport>(session: &mut Session<T>) -> Result<String, ClientError> {
    let response = session.execute(Endpoint::DeveloperMode, Method::Put, json!({"focus": true}))?;
    require_typed(&response, "focus")
}

/// Whether the lockscreen is up.
pub fn is_phone_locked<T: Transport>(session: &mut Session<T>) -> Result<bool, ClientError> {
    let response = session.execute(
        Endpoint::DeveloperMode,
        Method::Put,
        json!({"phoneLocked": true}),
    )?;
    require_typed(&response, "phoneLocked")
}

/// Switch USB tethering on or off.
pub fn set_tethering<T: Transport>(
    session: &mut Session<T>,
    enabled: bool,
) -> Result<(), ClientError> {
    let state = if enabled { "on" } else { "off" };
    log::info!("set tethering state to: {state}");
    session.execute(
        Endpoint::DeveloperMode,
        Method::Put,
        json!({"tethering": state}),
    )?;
    Ok(())
}

/// Pass an AT command through to the modem and return its response
/// lines. `timeout_ms` bounds the modem-side wait.
pub fn at_command<T: Transport>(
    session: &mut Session<T>,
    command: &str,
    timeout_ms: u64,
) -> Result<Value, ClientError> {
    let response = session.execute(
        Endpoint::DeveloperMode,
        Method::Put,
        json!({"AT": format!("{command}\r"), "timeout": timeout_ms}),
    )?;
    Ok(require_field(&response, "ATResponse")?.clone())
}

/// Enable or disable the lockscreen passcode requirement.
///
/// Disabling it also unlocks developer-mode calls that otherwise answer
/// 403.
pub fn set_phone_mode_lock<T: Transport>(
    session: &mut Session<T>,
    enabled: bool,
) -> Result<(), ClientError> {
    session.execute(
        Endpoint::DeveloperMode,
        Method::Put,
        json!({"phoneLockCodeEnabled": enabled}),
    )?;
    Ok(())
}

/// Set the log level of one firmware service, to keep chatty services
/// out of collected logs.
pub fn set_service_log_level<T: Transport>(
    session: &mut Session<T>,
    service: &str,
    level: u8,
) -> Result<(), ClientError> {
    session.execute(
        Endpoint::DeveloperMode,
        Method::Put,
        json!({"log": true, "service": service, "level": level}),
    )?;
    Ok(())
}

/// Fetch and parse the current window tree.
///
/// The first request after an application switch can race the endpoint
/// handler registration, which the firmware surfaces as 406; that one
/// status is retried once.
pub fn get_window_snapshot<T: Transport>(session: &mut Session<T>) -> Result<DomNode, ClientError> {
    let policy = RetryPolicy::retry_once_on(Status::NotAcceptable);
    let response = session.execute_with_policy(
        Endpoint::DeveloperMode,
        Method::Get,
        json!({"ui": true, "getWindow": true}),
        &policy,
    )?;
    let dom = require_field(&response, "dom")?;
    Ok(DomNode::from_value(dom)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdclink_protocol::frame;
    use cdclink_transport::mock::MockTransport;

    fn reply_frame(status: u16, body: Value) -> Vec<u8> {
        let payload = serde_json::to_vec(&json!({
            "endpoint": 11, "status": status, "uuid": 1, "body": body,
        }))
        .expect("valid JSON");
        frame::encode(&payload).expect("payload fits the length field")
    }

    fn window_body() -> Value {
        json!({"dom": {"Window": {
            "Active": true, "Focus": true, "ItemType": 0, "Visible": true,
            "ChildrenCount": 0,
        }}})
    }

    #[test]
    fn test_focused_application() {
        let mut mock = MockTransport::new();
        mock.queue_bytes(&reply_frame(200, json!({"focus": "ApplicationDesktop"})));
        let mut session = Session::new(mock);
        assert_eq!(
            focused_application(&mut session).expect("should succeed"),
            "ApplicationDesktop"
        );
    }

    #[test]
    fn test_window_snapshot_parses_dom() {
        let mut mock = MockTransport::new();
        mock.queue_bytes(&reply_frame(200, window_body()));
        let mut session = Session::new(mock);

        let root = get_window_snapshot(&mut session).expect("should parse");
        assert_eq!(root.type_name(), "Window");
        assert!(root.focus());
    }

    #[test]
    fn test_window_snapshot_retries_handler_race() {
        let mut mock = MockTransport::new();
        mock.queue_bytes(&reply_frame(406, json!({})));
        mock.queue_bytes(&reply_frame(200, window_body()));
        let mut session = Session::new(mock);

        let root = get_window_snapshot(&mut session).expect("second attempt should win");
        assert_eq!(root.type_name(), "Window");
    }

    #[test]
    fn test_window_snapshot_missing_dom() {
        let mut mock = MockTransport::new();
        mock.queue_bytes(&reply_frame(200, json!({})));
        let mut session = Session::new(mock);

        assert!(matches!(
            get_window_snapshot(&mut session).unwrap_err(),
            ClientError::MissingField { field: "dom" }
        ));
    }
}
