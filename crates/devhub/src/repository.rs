use crate::device::Device;
use crate::device::DeviceKind;

/// Maximum number of devices a repository holds.
pub const MAX_DEVICES: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("a device with id '{0}' already exists")]
    DuplicateId(String),

    #[error("repository is full ({} devices)", MAX_DEVICES)]
    CapacityExceeded,

    #[error("no device with id '{0}'")]
    NotFound(String),

    #[error("device '{id}' is a {stored}, cannot replace it with a {incoming}")]
    TypeMismatch {
        id: String,
        stored: DeviceKind,
        incoming: DeviceKind,
    },
}

/// Bounded, insertion-ordered store of devices keyed by id.
///
/// Every operation either succeeds completely or leaves the repository
/// untouched.
#[derive(Debug, Default)]
pub struct DeviceRepository {
    devices: Vec<Device>,
}

impl DeviceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.devices.len() >= MAX_DEVICES
    }

    /// Append a device. Duplicate ids are checked before capacity.
    pub fn add(&mut self, device: Device) -> Result<(), RepositoryError> {
        if self.position(device.id()).is_some() {
            return Err(RepositoryError::DuplicateId(device.id().to_string()));
        }
        if self.is_full() {
            return Err(RepositoryError::CapacityExceeded);
        }
        self.devices.push(device);
        Ok(())
    }

    /// Replace the stored device with the same id, keeping its position.
    ///
    /// The replacement must be of the same [`DeviceKind`] as the stored
    /// record. Returns the record that was replaced.
    pub fn update(&mut self, device: Device) -> Result<Device, RepositoryError> {
        let index = self
            .position(device.id())
            .ok_or_else(|| RepositoryError::NotFound(device.id().to_string()))?;

        let stored = self.devices[index].kind();
        if stored != device.kind() {
            return Err(RepositoryError::TypeMismatch {
                id: device.id().to_string(),
                stored,
                incoming: device.kind(),
            });
        }

        Ok(std::mem::replace(&mut self.devices[index], device))
    }

    pub fn remove(&mut self, id: &str) -> Result<Device, RepositoryError> {
        let index = self
            .position(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        Ok(self.devices.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Device> {
        self.devices.iter_mut().find(|d| d.id() == id)
    }

    /// All devices in insertion order.
    pub fn all(&self) -> &[Device] {
        &self.devices
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.devices.iter().position(|d| d.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::PersonalComputer;
    use crate::device::Smartwatch;

    fn pc(id: &str, os: Option<&str>) -> Device {
        PersonalComputer::new(id, "Box", false, os.map(str::to_string))
            .unwrap()
            .into()
    }

    fn watch(id: &str) -> Device {
        Smartwatch::new(id, "Watch", false, 50).unwrap().into()
    }

    #[test]
    fn test_add_then_get() {
        let mut repo = DeviceRepository::new();
        let device = pc("P-1", Some("Linux"));
        repo.add(device.clone()).unwrap();

        assert_eq!(repo.get("P-1"), Some(&device));
        assert_eq!(repo.get("P-2"), None);
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_duplicate_id_leaves_repository_unchanged() {
        let mut repo = DeviceRepository::new();
        let original = pc("P-1", Some("Linux"));
        repo.add(original.clone()).unwrap();

        let result = repo.add(pc("P-1", None));
        assert_eq!(result, Err(RepositoryError::DuplicateId("P-1".to_string())));
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.get("P-1"), Some(&original));
    }

    #[test]
    fn test_capacity() {
        let mut repo = DeviceRepository::new();
        for i in 0..MAX_DEVICES {
            repo.add(pc(&format!("P-{i}"), None)).unwrap();
        }
        assert!(repo.is_full());

        assert_eq!(
            repo.add(pc("P-extra", None)),
            Err(RepositoryError::CapacityExceeded)
        );
        assert_eq!(repo.len(), MAX_DEVICES);

        // Duplicates are reported as such even when full.
        assert_eq!(
            repo.add(pc("P-0", None)),
            Err(RepositoryError::DuplicateId("P-0".to_string()))
        );

        // Removal frees a slot.
        repo.remove("P-3").unwrap();
        repo.add(pc("P-extra", None)).unwrap();
        assert_eq!(repo.len(), MAX_DEVICES);
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut repo = DeviceRepository::new();
        repo.add(watch("SW-1")).unwrap();
        repo.add(pc("P-1", None)).unwrap();
        repo.add(watch("SW-2")).unwrap();

        let replacement = pc("P-1", Some("BSD"));
        let previous = repo.update(replacement.clone()).unwrap();

        assert_eq!(previous, pc("P-1", None));
        assert_eq!(repo.get("P-1"), Some(&replacement));
        let ids: Vec<&str> = repo.all().iter().map(Device::id).collect();
        assert_eq!(ids, ["SW-1", "P-1", "SW-2"]);
    }

    #[test]
    fn test_update_unknown_id() {
        let mut repo = DeviceRepository::new();
        assert_eq!(
            repo.update(pc("P-9", None)),
            Err(RepositoryError::NotFound("P-9".to_string()))
        );
    }

    #[test]
    fn test_update_type_mismatch() {
        let mut repo = DeviceRepository::new();
        let stored = pc("P-1", Some("Linux"));
        repo.add(stored.clone()).unwrap();

        // Constructors check id prefixes, so a mismatch has to be forced.
        let impostor = watch("SW-1").with_unchecked_id("P-1");

        assert_eq!(
            repo.update(impostor),
            Err(RepositoryError::TypeMismatch {
                id: "P-1".to_string(),
                stored: DeviceKind::PersonalComputer,
                incoming: DeviceKind::Smartwatch,
            })
        );
        assert_eq!(repo.get("P-1"), Some(&stored));
    }

    #[test]
    fn test_remove() {
        let mut repo = DeviceRepository::new();
        repo.add(pc("P-1", None)).unwrap();

        assert_eq!(
            repo.remove("P-2"),
            Err(RepositoryError::NotFound("P-2".to_string()))
        );
        assert_eq!(repo.len(), 1);

        repo.remove("P-1").unwrap();
        assert_eq!(repo.get("P-1"), None);
        assert!(repo.is_empty());
    }
}
