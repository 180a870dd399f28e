use serde::Serialize;

use super::DeviceError;
use super::DeviceKind;
use super::check_id;
use super::check_text;

/// A personal computer. It can only be powered on with an operating system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonalComputer {
    pub(super) id: String,
    name: String,
    enabled: bool,
    operating_system: Option<String>,
}

impl PersonalComputer {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        enabled: bool,
        operating_system: Option<String>,
    ) -> Result<Self, DeviceError> {
        Ok(Self {
            id: check_id(id.into(), DeviceKind::PersonalComputer)?,
            name: check_text("name", name.into())?,
            enabled,
            operating_system: normalize_os(operating_system)?,
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

    pub fn operating_system(&self) -> Option<&str> {
        self.operating_system.as_deref()
    }

    /// A blank name counts as no operating system.
    pub fn set_operating_system(
        &mut self,
        operating_system: Option<String>,
    ) -> Result<(), DeviceError> {
        self.operating_system = normalize_os(operating_system)?;
        Ok(())
    }

    pub fn turn_on(&mut self) -> Result<(), DeviceError> {
        if self.operating_system.is_none() {
            return Err(DeviceError::MissingOperatingSystem(self.id.clone()));
        }
        self.enabled = true;
        Ok(())
    }

    pub fn turn_off(&mut self) {
        self.enabled = false;
    }

    /// `id,name,enabled[,os]`. The OS column is left out when none is set.
    pub fn serialize(&self) -> String {
        match &self.operating_system {
            Some(os) => format!("{},{},{},{}", self.id, self.name, self.enabled, os),
            None => format!("{},{},{}", self.id, self.name, self.enabled),
        }
    }
}

fn normalize_os(operating_system: Option<String>) -> Result<Option<String>, DeviceError> {
    operating_system
        .filter(|os| !os.trim().is_empty())
        .map(|os| check_text("operating system", os))
        .transpose()
}
