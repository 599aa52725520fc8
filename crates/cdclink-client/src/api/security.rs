//! USB security endpoint: phone lock state and unlocking.

use serde_json::json;

use cdclink_protocol::{Endpoint, Method, Status};
use cdclink_transport::Transport;

use crate::reply::require_typed;
use crate::{ClientError, Session};

/// Factory-default lockscreen passcode.
pub const DEFAULT_PASSCODE: [u8; 4] = [3, 3, 3, 3];

/// Whether the phone lock currently blocks USB access.
///
/// The endpoint answers the status category with 200 when the phone is
/// unlocked and 403 while the lock is engaged.
pub fn is_phone_locked<T: Transport>(session: &mut Session<T>) -> Result<bool, ClientError> {
    let result = session.execute(
        Endpoint::UsbSecurity,
        Method::Get,
        json!({"category": "phoneLockStatus"}),
    );
    match result {
        Ok(_) => Ok(false),
        Err(ClientError::Transaction {
            status: Status::Forbidden,
            ..
        }) => Ok(true),
        Err(err) => Err(err),
    }
}

/// Seconds until the next unlock attempt is allowed, after too many
/// failed passcodes.
pub fn get_phone_lock_time<T: Transport>(session: &mut Session<T>) -> Result<u64, ClientError> {
    let response = session.execute(
        Endpoint::UsbSecurity,
        Method::Get,
        json!({"category": "phoneLockTime"}),
    )?;
    require_typed(&response, "phoneLockTime")
}

/// Disengage the phone lock with a passcode.
pub fn unlock_phone<T: Transport>(
    session: &mut Session<T>,
    passcode: &[u8],
) -> Result<(), ClientError> {
    session.execute(
        Endpoint::UsbSecurity,
        Method::Put,
        json!({"phoneLockCode": passcode}),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdclink_protocol::frame;
    use cdclink_transport::mock::MockTransport;
    use serde_json::Value;

    fn reply_frame(status: u16, body: Value) -> Vec<u8> {
        let payload = serde_json::to_vec(&json!({
            "endpoint": 13, "status": status, "uuid": 1, "body": body,
        }))
        .expect("valid JSON");
        frame::encode(&payload).expect("payload fits the length field")
    }

    #[test]
    fn test_lock_status_mapping() {
        let mut mock = MockTransport::new();
        mock.queue_bytes(&reply_frame(200, json!({})));
        let mut session = Session::new(mock);
        assert!(!is_phone_locked(&mut session).expect("should succeed"));

        let mut mock = MockTransport::new();
        mock.queue_bytes(&reply_frame(403, json!({})));
        let mut session = Session::new(mock);
        assert!(is_phone_locked(&mut session).expect("403 means locked"));
    }

    #[test]
    fn test_lock_time_extracted() {
        let mut mock = MockTransport::new();
        mock.queue_bytes(&reply_frame(200, json!({"phoneLockTime": 30})));
        let mut session = Session::new(mock);
        assert_eq!(get_phone_lock_time(&mut session).expect("should succeed"), 30);
    }

    #[test]
    fn test_lock_time_missing_field() {
        let mut mock = MockTransport::new();
        mock.queue_bytes(&reply_frame(200, json!({})));
        let mut session = Session::new(mock);
        assert!(matches!(
            get_phone_lock_time(&mut session).unwrap_err(),
            ClientError::MissingField {
                field: "phoneLockTime"
            }
        ));
    }
}
