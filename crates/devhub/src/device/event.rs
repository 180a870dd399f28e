use std::fmt;

/// Battery level below which a smartwatch emits [`DeviceEvent::LowBattery`].
pub const LOW_BATTERY_THRESHOLD: u8 = 20;

/// Notifications produced by device operations.
///
/// Devices never report these themselves. Operations that can notify return
/// the event and the caller decides where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    LowBattery { device_id: String, level: u8 },
}

impl DeviceEvent {
    /// Low-battery event for `level`, if it is below the threshold.
    pub(crate) fn low_battery(device_id: &str, level: u8) -> Option<Self> {
        (level < LOW_BATTERY_THRESHOLD).then(|| DeviceEvent::LowBattery {
            device_id: device_id.to_string(),
            level,
        })
    }
}

impl fmt::Display for DeviceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceEvent::LowBattery { device_id, level } => {
                write!(f, "low battery on '{device_id}': {level}%")
            }
        }
    }
}
