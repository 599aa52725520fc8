//! USB serial port discovery.
//!
//! The device is identified among the host's serial ports by the
//! manufacturer and product strings in its USB descriptor.

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use serialport::{SerialPortInfo, SerialPortType, UsbPortInfo};

use crate::TransportError;

/// USB descriptor strings identifying the device.
///
/// A `None` field matches anything.
#[derive(Debug, Clone, Default)]
pub struct DeviceFilter {
    /// Expected manufacturer string.
    pub manufacturer: Option<String>,
    /// Expected product string.
    pub product: Option<String>,
}

impl DeviceFilter {
    /// Filter on both manufacturer and product strings.
    pub fn new(manufacturer: &str, product: &str) -> Self {
        DeviceFilter {
            manufacturer: Some(manufacturer.to_string()),
            product: Some(product.to_string()),
        }
    }

    fn matches(&self, usb: &UsbPortInfo) -> bool {
        let manufacturer_ok = match &self.manufacturer {
            Some(want) => usb.manufacturer.as_deref() == Some(want.as_str()),
            None => true,
        };
        let product_ok = match &self.product {
            Some(want) => usb.product.as_deref() == Some(want.as_str()),
            None => true,
        };
        manufacturer_ok && product_ok
    }
}

impl fmt::Display for DeviceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "manufacturer={} product={}",
            self.manufacturer.as_deref().unwrap_or("*"),
            self.product.as_deref().unwrap_or("*"),
        )
    }
}

/// Enumerate serial ports whose USB descriptor matches `filter`.
///
/// Returns the unique port paths, one per connected device.
pub fn find_devices(filter: &DeviceFilter) -> Result<Vec<String>, TransportError> {
    let ports = serialport::available_ports()?;
    Ok(matching_ports(ports, filter))
}

fn matching_ports(ports: Vec<SerialPortInfo>, filter: &DeviceFilter) -> Vec<String> {
    ports
        .into_iter()
        .filter_map(|info| match info.port_type {
            SerialPortType::UsbPort(ref usb) if filter.matches(usb) => Some(info.port_name),
            _ => None,
        })
        .collect()
}

/// Poll for a matching device at 1-second intervals.
///
/// Returns the first matching port path, or [`TransportError::DeviceNotFound`]
/// once `timeout` elapses without one appearing.
pub fn wait_for_device(filter: &DeviceFilter, timeout: Duration) -> Result<String, TransportError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(port) = find_devices(filter)?.into_iter().next() {
            return Ok(port);
        }
        if Instant::now() >= deadline {
            return Err(TransportError::DeviceNotFound {
                port: filter.to_string(),
                waited: timeout,
            });
        }
        log::debug!("waiting for a serial port matching {filter}...");
        thread::sleep(Duration::from_secs(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usb_port(name: &str, manufacturer: Option<&str>, product: Option<&str>) -> SerialPortInfo {
        SerialPortInfo {
            port_name: name.to_string(),
            port_type: SerialPortType::UsbPort(UsbPortInfo {
                vid: 0x3310,
                pid: 0x0100,
                serial_number: None,
                manufacturer: manufacturer.map(str::to_string),
                product: product.map(str::to_string),
            }),
        }
    }

    #[test]
    fn test_filter_matches_descriptor_strings() {
        let ports = vec![
            usb_port("/dev/ttyACM0", Some("Acme"), Some("Widget")),
            usb_port("/dev/ttyACM1", Some("Phoneco"), Some("Featherphone")),
            usb_port("/dev/ttyACM2", Some("Phoneco"), Some("Other")),
        ];
        let filter = DeviceFilter::new("Phoneco", "Featherphone");
        assert_eq!(matching_ports(ports, &filter), vec!["/dev/ttyACM1"]);
    }

    #[test]
    fn test_wildcard_filter_takes_any_usb_port() {
        let ports = vec![
            usb_port("/dev/ttyACM0", Some("Acme"), None),
            SerialPortInfo {
                port_name: "/dev/ttyS0".to_string(),
                port_type: SerialPortType::Unknown,
            },
        ];
        // Non-USB ports never match, even with a wildcard filter.
        assert_eq!(
            matching_ports(ports, &DeviceFilter::default()),
            vec!["/dev/ttyACM0"]
        );
    }

    #[test]
    fn test_no_match_is_empty() {
        let ports = vec![usb_port("/dev/ttyACM0", Some("Acme"), Some("Widget"))];
        let filter = DeviceFilter::new("Phoneco", "Featherphone");
        assert!(matching_ports(ports, &filter).is_empty());
    }
}
