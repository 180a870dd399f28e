use std::net::Ipv4Addr;

use serde::Serialize;

use super::DeviceError;
use super::DeviceKind;
use super::check_id;
use super::check_text;

/// Substring a network name must contain for an embedded device to connect.
pub const TRUST_ANCHOR: &str = "MD Ltd.";

/// An embedded network device.
///
/// `connected` is runtime state only; it is neither parsed nor persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbeddedDevice {
    pub(super) id: String,
    name: String,
    enabled: bool,
    ip_address: Ipv4Addr,
    network_name: String,
    #[serde(skip)]
    connected: bool,
}

impl EmbeddedDevice {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        enabled: bool,
        ip_address: &str,
        network_name: impl Into<String>,
    ) -> Result<Self, DeviceError> {
        Ok(Self {
            id: check_id(id.into(), DeviceKind::EmbeddedDevice)?,
            name: check_text("name", name.into())?,
            enabled,
            ip_address: parse_ip(ip_address)?,
            network_name: check_text("network name", network_name.into())?,
            connected: false,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), DeviceError> {
        self.name = check_text("name", name.into())?;
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn ip_address(&self) -> Ipv4Addr {
        self.ip_address
    }

    pub fn set_ip_address(&mut self, ip_address: &str) -> Result<(), DeviceError> {
        self.ip_address = parse_ip(ip_address)?;
        Ok(())
    }

    pub fn network_name(&self) -> &str {
        &self.network_name
    }

    pub fn set_network_name(&mut self, network_name: impl Into<String>) -> Result<(), DeviceError> {
        self.network_name = check_text("network name", network_name.into())?;
        Ok(())
    }

    /// Connects to the configured network, then powers on.
    pub fn turn_on(&mut self) -> Result<(), DeviceError> {
        self.connect()?;
        self.enabled = true;
        Ok(())
    }

    pub fn turn_off(&mut self) {
        self.enabled = false;
        self.connected = false;
    }

    pub fn serialize(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.id, self.name, self.enabled, self.ip_address, self.network_name
        )
    }

    fn connect(&mut self) -> Result<(), DeviceError> {
        if !self.network_name.contains(TRUST_ANCHOR) {
            return Err(DeviceError::ConnectionRejected {
                id: self.id.clone(),
                network: self.network_name.clone(),
            });
        }
        self.connected = true;
        Ok(())
    }
}

/// Dotted-quad IPv4 only; every octet must be 0..=255 without leading zeros.
fn parse_ip(value: &str) -> Result<Ipv4Addr, DeviceError> {
    value
        .parse()
        .map_err(|_| DeviceError::InvalidFormat(value.to_string()))
}
