//! Update endpoint: reboot control.

use serde_json::json;

use cdclink_protocol::{Endpoint, Method};
use cdclink_transport::{Transport, TransportError};

use crate::{ClientError, Session};

use std::time::Duration;

/// Ask the firmware to reboot.
pub fn request_reboot<T: Transport>(session: &mut Session<T>) -> Result<(), ClientError> {
    session.execute(
        Endpoint::Update,
        Method::Post,
        json!({"update": true, "reboot": true}),
    )?;
    Ok(())
}

/// Reboot into USB mass-storage mode.
pub fn reboot_to_usb_msc<T: Transport>(session: &mut Session<T>) -> Result<(), ClientError> {
    session.execute(
        Endpoint::Update,
        Method::Put,
        json!({"rebootMode": "usbMscMode"}),
    )?;
    Ok(())
}

/// Request a reboot and wait for the reset event confirming it took
/// effect.
///
/// The device may drop off the bus before its reply makes it out, so a
/// reset or lost reply during the request itself already counts as
/// confirmation progress rather than failure.
pub fn reboot_and_wait<T: Transport>(
    session: &mut Session<T>,
    reboot_timeout: Duration,
) -> Result<bool, ClientError> {
    match request_reboot(session) {
        Ok(()) => {}
        Err(ClientError::Transport(TransportError::DeviceRebooted)) => return Ok(true),
        Err(ClientError::Transport(TransportError::NothingRead { .. })) => {
            log::debug!("reboot reply lost in the reset");
        }
        Err(err) => return Err(err),
    }
    Ok(session.transport_mut().wait_for_reboot(reboot_timeout)?)
}
