use serde::Serialize;

use super::DeviceError;
use super::DeviceEvent;
use super::DeviceKind;
use super::check_id;
use super::check_text;

/// Battery level a smartwatch needs to be powered on.
pub const MIN_BATTERY_TO_POWER_ON: u8 = 11;

/// Battery drained by one power-on.
const POWER_ON_DRAIN: u8 = 10;

/// A smartwatch with a battery level between 0 and 100 inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Smartwatch {
    pub(super) id: String,
    name: String,
    enabled: bool,
    battery_level: u8,
}

impl Smartwatch {
    /// Construction validates the level but does not notify.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        enabled: bool,
        battery_level: i64,
    ) -> Result<Self, DeviceError> {
        Ok(Self {
            id: check_id(id.into(), DeviceKind::Smartwatch)?,
            name: check_text("name", name.into())?,
            enabled,
            battery_level: validate_level(battery_level)?,
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

    pub fn battery_level(&self) -> u8 {
        self.battery_level
    }

    pub fn set_battery_level(&mut self, level: i64) -> Result<Option<DeviceEvent>, DeviceError> {
        self.battery_level = validate_level(level)?;
        Ok(DeviceEvent::low_battery(&self.id, self.battery_level))
    }

    /// Powering on drains ten percent of battery.
    pub fn turn_on(&mut self) -> Result<Option<DeviceEvent>, DeviceError> {
        if self.battery_level < MIN_BATTERY_TO_POWER_ON {
            return Err(DeviceError::BatteryTooLow {
                id: self.id.clone(),
                level: self.battery_level,
            });
        }
        self.enabled = true;
        self.battery_level -= POWER_ON_DRAIN;
        Ok(DeviceEvent::low_battery(&self.id, self.battery_level))
    }

    pub fn turn_off(&mut self) {
        self.enabled = false;
    }

    pub fn serialize(&self) -> String {
        format!(
            "{},{},{},{}%",
            self.id, self.name, self.enabled, self.battery_level
        )
    }
}

fn validate_level(level: i64) -> Result<u8, DeviceError> {
    match u8::try_from(level) {
        Ok(level) if level <= 100 => Ok(level),
        _ => Err(DeviceError::OutOfRange(level)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_range() {
        assert_eq!(
            Smartwatch::new("SW-1", "Watch", false, 101),
            Err(DeviceError::OutOfRange(101))
        );
        assert_eq!(
            Smartwatch::new("SW-1", "Watch", false, -1),
            Err(DeviceError::OutOfRange(-1))
        );
        assert!(Smartwatch::new("SW-1", "Watch", false, 0).is_ok());
        assert!(Smartwatch::new("SW-1", "Watch", false, 100).is_ok());
    }

    #[test]
    fn test_turn_on_at_threshold() {
        let mut watch = Smartwatch::new("SW-1", "Watch", false, 10).unwrap();
        assert_eq!(
            watch.turn_on(),
            Err(DeviceError::BatteryTooLow {
                id: "SW-1".to_string(),
                level: 10,
            })
        );
        assert!(!watch.is_enabled());
        assert_eq!(watch.battery_level(), 10);

        let mut watch = Smartwatch::new("SW-2", "Watch", false, 11).unwrap();
        let event = watch.turn_on().unwrap();
        assert!(watch.is_enabled());
        assert_eq!(watch.battery_level(), 1);
        assert_eq!(
            event,
            Some(DeviceEvent::LowBattery {
                device_id: "SW-2".to_string(),
                level: 1,
            })
        );
    }

    #[test]
    fn test_turn_on_with_healthy_battery_is_quiet() {
        let mut watch = Smartwatch::new("SW-1", "Watch", false, 80).unwrap();
        assert_eq!(watch.turn_on(), Ok(None));
        assert_eq!(watch.battery_level(), 70);
    }

    #[test]
    fn test_set_battery_level() {
        let mut watch = Smartwatch::new("SW-1", "Watch", true, 50).unwrap();

        assert_eq!(watch.set_battery_level(20), Ok(None));
        assert_eq!(
            watch.set_battery_level(19),
            Ok(Some(DeviceEvent::LowBattery {
                device_id: "SW-1".to_string(),
                level: 19,
            }))
        );

        assert_eq!(watch.set_battery_level(250), Err(DeviceError::OutOfRange(250)));
        assert_eq!(watch.battery_level(), 19);
    }

    #[test]
    fn test_serialize() {
        let watch = Smartwatch::new("SW-1", "Watch", true, 27).unwrap();
        assert_eq!(watch.serialize(), "SW-1,Watch,true,27%");
    }

    #[test]
    fn test_rejects_separators_in_name() {
        assert!(matches!(
            Smartwatch::new("SW-1", "Watch,2", false, 50),
            Err(DeviceError::InvalidText { field: "name", .. })
        ));

        let mut watch = Smartwatch::new("SW-1", "Watch", false, 50).unwrap();
        assert!(watch.set_name("Wrist\nwatch").is_err());
        watch.set_name("Wristwatch").unwrap();
        assert_eq!(watch.serialize(), "SW-1,Wristwatch,false,50%");
    }
}
