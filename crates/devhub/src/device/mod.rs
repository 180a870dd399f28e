//! Device model for devhub.
//!
//! A [`Device`] is one of three closed variants. Each variant owns its
//! validation and power-state rules; this module only dispatches.

mod computer;
mod embedded;
mod event;
mod smartwatch;

use std::fmt;

use serde::Serialize;
use strum::Display;

pub use computer::PersonalComputer;
pub use embedded::EmbeddedDevice;
pub use embedded::TRUST_ANCHOR;
pub use event::DeviceEvent;
pub use event::LOW_BATTERY_THRESHOLD;
pub use smartwatch::MIN_BATTERY_TO_POWER_ON;
pub use smartwatch::Smartwatch;

/// The concrete variant of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    PersonalComputer,
    Smartwatch,
    EmbeddedDevice,
}

impl DeviceKind {
    pub const ALL: [DeviceKind; 3] = [
        DeviceKind::PersonalComputer,
        DeviceKind::Smartwatch,
        DeviceKind::EmbeddedDevice,
    ];

    /// Prefix every id of this kind must start with.
    pub fn id_prefix(self) -> &'static str {
        match self {
            DeviceKind::PersonalComputer => "P-",
            DeviceKind::Smartwatch => "SW-",
            DeviceKind::EmbeddedDevice => "ED-",
        }
    }

    /// Select the kind an id belongs to by its prefix.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| id.starts_with(kind.id_prefix()))
    }
}

/// Errors raised by device construction, setters and power transitions.
///
/// A failing call never changes the device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("id '{id}' must start with '{}' for a {kind}", .kind.id_prefix())]
    InvalidIdPrefix { id: String, kind: DeviceKind },

    #[error("battery level {0} is outside 0..=100")]
    OutOfRange(i64),

    #[error("'{0}' is not a valid IPv4 address")]
    InvalidFormat(String),

    #[error("device '{0}' has no operating system installed")]
    MissingOperatingSystem(String),

    #[error("battery of '{id}' is too low to power on ({level}%)")]
    BatteryTooLow { id: String, level: u8 },

    #[error("network '{network}' rejected connection from '{id}'")]
    ConnectionRejected { id: String, network: String },

    #[error("{field} {value:?} must not contain commas or line breaks")]
    InvalidText { field: &'static str, value: String },
}

/// Characters that cannot appear in a persisted text field.
const FORBIDDEN_TEXT: [char; 3] = [',', '\n', '\r'];

/// Reject text that would not survive a save and reload.
pub(crate) fn check_text(field: &'static str, value: String) -> Result<String, DeviceError> {
    if value.contains(FORBIDDEN_TEXT) {
        return Err(DeviceError::InvalidText { field, value });
    }
    Ok(value)
}

pub(crate) fn check_id(id: String, kind: DeviceKind) -> Result<String, DeviceError> {
    if !id.starts_with(kind.id_prefix()) {
        return Err(DeviceError::InvalidIdPrefix { id, kind });
    }
    check_text("id", id)
}

/// A managed device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Device {
    PersonalComputer(PersonalComputer),
    Smartwatch(Smartwatch),
    EmbeddedDevice(EmbeddedDevice),
}

impl Device {
    pub fn kind(&self) -> DeviceKind {
        match self {
            Device::PersonalComputer(_) => DeviceKind::PersonalComputer,
            Device::Smartwatch(_) => DeviceKind::Smartwatch,
            Device::EmbeddedDevice(_) => DeviceKind::EmbeddedDevice,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Device::PersonalComputer(d) => d.id(),
            Device::Smartwatch(d) => d.id(),
            Device::EmbeddedDevice(d) => d.id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Device::PersonalComputer(d) => d.name(),
            Device::Smartwatch(d) => d.name(),
            Device::EmbeddedDevice(d) => d.name(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            Device::PersonalComputer(d) => d.is_enabled(),
            Device::Smartwatch(d) => d.is_enabled(),
            Device::EmbeddedDevice(d) => d.is_enabled(),
        }
    }

    /// Power the device on.
    ///
    /// Returns the notification the transition produced, if any.
    pub fn turn_on(&mut self) -> Result<Option<DeviceEvent>, DeviceError> {
        match self {
            Device::PersonalComputer(d) => d.turn_on().map(|()| None),
            Device::Smartwatch(d) => d.turn_on(),
            Device::EmbeddedDevice(d) => d.turn_on().map(|()| None),
        }
    }

    pub fn turn_off(&mut self) {
        match self {
            Device::PersonalComputer(d) => d.turn_off(),
            Device::Smartwatch(d) => d.turn_off(),
            Device::EmbeddedDevice(d) => d.turn_off(),
        }
    }

    /// Canonical persisted line for this device.
    pub fn serialize(&self) -> String {
        match self {
            Device::PersonalComputer(d) => d.serialize(),
            Device::Smartwatch(d) => d.serialize(),
            Device::EmbeddedDevice(d) => d.serialize(),
        }
    }

    /// Low-battery notification for the device as it stands, if any.
    pub fn low_battery(&self) -> Option<DeviceEvent> {
        match self {
            Device::Smartwatch(d) => DeviceEvent::low_battery(d.id(), d.battery_level()),
            _ => None,
        }
    }

    /// Human-readable one-line summary.
    pub fn describe(&self) -> String {
        self.to_string()
    }

    /// Overwrite the id without the prefix check, to build records no
    /// constructor allows.
    #[cfg(test)]
    pub(crate) fn with_unchecked_id(mut self, id: &str) -> Self {
        match &mut self {
            Device::PersonalComputer(d) => d.id = id.to_string(),
            Device::Smartwatch(d) => d.id = id.to_string(),
            Device::EmbeddedDevice(d) => d.id = id.to_string(),
        }
        self
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let power = if self.is_enabled() { "on" } else { "off" };
        write!(f, "[{}] {} '{}' ({power})", self.kind(), self.id(), self.name())?;
        match self {
            Device::PersonalComputer(d) => match d.operating_system() {
                Some(os) => write!(f, " os={os}"),
                None => write!(f, " os=<none>"),
            },
            Device::Smartwatch(d) => write!(f, " battery={}%", d.battery_level()),
            Device::EmbeddedDevice(d) => write!(
                f,
                " ip={} network='{}'{}",
                d.ip_address(),
                d.network_name(),
                if d.is_connected() { " connected" } else { "" }
            ),
        }
    }
}

impl From<PersonalComputer> for Device {
    fn from(device: PersonalComputer) -> Self {
        Device::PersonalComputer(device)
    }
}

impl From<Smartwatch> for Device {
    fn from(device: Smartwatch) -> Self {
        Device::Smartwatch(device)
    }
}

impl From<EmbeddedDevice> for Device {
    fn from(device: EmbeddedDevice) -> Self {
        Device::EmbeddedDevice(device)
    }
}
