use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::device::Device;
use crate::device::DeviceError;
use crate::device::DeviceEvent;
use crate::diagnostics::LoadError;
use crate::diagnostics::LoadReport;
use crate::parser::parse_line;
use crate::repository::DeviceRepository;
use crate::repository::RepositoryError;
use crate::storage::LineSink;
use crate::storage::LineSource;
use crate::storage::StorageError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManagerError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("device '{id}' does not support {operation}")]
    UnsupportedOperation { id: String, operation: &'static str },
}

/// Public operations over a device repository.
///
/// Built from a bulk load; afterwards every call is a single, atomic change.
/// Notifications raised by devices are queued until [`drain_events`] is
/// called.
///
/// [`drain_events`]: DeviceManager::drain_events
#[derive(Debug, Default)]
pub struct DeviceManager {
    repository: DeviceRepository,
    events: Vec<DeviceEvent>,
}

impl DeviceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every line of `source`, skipping lines that fail.
    ///
    /// Only a failure to read the source itself is an error.
    pub fn load<S: LineSource + ?Sized>(
        source: &mut S,
    ) -> Result<(Self, LoadReport), StorageError> {
        let lines = source.read_lines()?;
        Ok(Self::from_lines(&lines))
    }

    /// Parse and store `lines` in order. Failing lines are recorded in the
    /// report and skipped; blank lines are ignored. Smartwatches loaded with a
    /// low battery are notified like any other low level.
    pub fn from_lines<L: AsRef<str>>(lines: &[L]) -> (Self, LoadReport) {
        let mut manager = Self::new();
        let mut report = LoadReport::default();

        for (index, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            if line.trim().is_empty() {
                debug!("Skipping blank line {}", index + 1);
                continue;
            }

            let result = parse_line(line, index)
                .map_err(LoadError::from)
                .and_then(|device| {
                    let event = device.low_battery();
                    manager
                        .repository
                        .add(device)
                        .map(|()| event)
                        .map_err(|source| LoadError::Rejected {
                            line: index,
                            source,
                        })
                });

            match result {
                Ok(event) => {
                    report.loaded += 1;
                    manager.notify(event);
                }
                Err(e) => {
                    warn!("Skipping device: {}", e);
                    report.failures.push(e);
                }
            }
        }

        info!(
            "Loaded {} devices ({} lines skipped)",
            report.loaded,
            report.failures.len()
        );
        (manager, report)
    }

    pub fn add_device(&mut self, device: Device) -> Result<(), ManagerError> {
        let id = device.id().to_string();
        let event = device.low_battery();
        self.repository.add(device)?;
        info!("Added device {}", id);
        self.notify(event);
        Ok(())
    }

    /// Replace the stored record that has the same id as `device`.
    pub fn edit_device(&mut self, device: Device) -> Result<(), ManagerError> {
        let id = device.id().to_string();
        let event = device.low_battery();
        self.repository.update(device)?;
        info!("Updated device {}", id);
        self.notify(event);
        Ok(())
    }

    pub fn remove_device(&mut self, id: &str) -> Result<Device, ManagerError> {
        let device = self.repository.remove(id)?;
        info!("Removed device {}", id);
        Ok(device)
    }

    pub fn device(&self, id: &str) -> Option<&Device> {
        self.repository.get(id)
    }

    /// All devices in insertion order.
    pub fn devices(&self) -> &[Device] {
        self.repository.all()
    }

    pub fn turn_on_device(&mut self, id: &str) -> Result<(), ManagerError> {
        let event = self.device_mut(id)?.turn_on()?;
        info!("Turned on {}", id);
        self.notify(event);
        Ok(())
    }

    pub fn turn_off_device(&mut self, id: &str) -> Result<(), ManagerError> {
        self.device_mut(id)?.turn_off();
        info!("Turned off {}", id);
        Ok(())
    }

    pub fn set_battery_level(&mut self, id: &str, level: i64) -> Result<(), ManagerError> {
        let Device::Smartwatch(watch) = self.device_mut(id)? else {
            return Err(ManagerError::UnsupportedOperation {
                id: id.to_string(),
                operation: "battery levels",
            });
        };
        let event = watch.set_battery_level(level)?;
        self.notify(event);
        Ok(())
    }

    /// `describe()` of every device, in insertion order.
    pub fn list_all(&self) -> Vec<String> {
        self.repository.all().iter().map(Device::describe).collect()
    }

    /// Write every device as one line, in insertion order, in a single call
    /// to `sink`.
    pub fn save_all<S: LineSink + ?Sized>(&self, sink: &mut S) -> Result<(), StorageError> {
        let lines: Vec<String> = self.repository.all().iter().map(Device::serialize).collect();
        sink.write_lines(&lines)?;
        info!("Saved {} devices", lines.len());
        Ok(())
    }

    /// Take the notifications queued since the last call.
    pub fn drain_events(&mut self) -> Vec<DeviceEvent> {
        std::mem::take(&mut self.events)
    }

    fn device_mut(&mut self, id: &str) -> Result<&mut Device, ManagerError> {
        self.repository
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()).into())
    }

    fn notify(&mut self, event: Option<DeviceEvent>) {
        if let Some(event) = event {
            warn!("{}", event);
            self.events.push(event);
        }
    }
}
