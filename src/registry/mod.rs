//! Resource registry — the device's exposed surface.
//!
//! An explicit table of [`Resource`] entries keyed by path, constructed
//! once at startup by [`objects`] and passed by reference to every
//! component that needs it.  All server-visible state lives here; hardware
//! callbacks and execute handlers mutate values exclusively through this
//! registry on the main-loop thread.
//!
//! Observable resources accumulate a dirty set on every write; the control
//! loop drains it with [`ResourceRegistry::take_dirty`] and forwards change
//! notifications to the registrar.

pub mod objects;
pub mod resource;

use std::collections::BTreeMap;

pub use resource::{
    BlockHook, ExecuteHook, Operation, Operations, Resource, ResourcePath, SemanticType,
};

use crate::error::RegistryError;

/// The resource table.  Single writer at a time is guaranteed by the
/// single-threaded execution model, not by locking.
pub struct ResourceRegistry {
    resources: BTreeMap<ResourcePath, Resource>,
    dirty: Vec<ResourcePath>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self {
            resources: BTreeMap::new(),
            dirty: Vec::new(),
        }
    }

    /// Insert a resource at startup.  Inserting the same path twice is a
    /// wiring error and is rejected rather than silently replaced.
    pub fn insert(&mut self, resource: Resource) -> Result<(), RegistryError> {
        let path = resource.path;
        if self.resources.contains_key(&path) {
            return Err(RegistryError::DuplicatePath);
        }
        self.resources.insert(path, resource);
        Ok(())
    }

    pub fn get(&self, path: ResourcePath) -> Option<&Resource> {
        self.resources.get(&path)
    }

    /// Last-set value bytes for `path`.  Side-effect free.
    pub fn value(&self, path: ResourcePath) -> Result<&[u8], RegistryError> {
        self.resources
            .get(&path)
            .map(Resource::value)
            .ok_or(RegistryError::UnknownPath)
    }

    /// Overwrite the value at `path`.  Never fails for a known path; if the
    /// resource is observable the path joins the dirty set so the control
    /// loop can emit a change notification.
    pub fn set_value(&mut self, path: ResourcePath, value: &[u8]) -> Result<(), RegistryError> {
        let resource = self
            .resources
            .get_mut(&path)
            .ok_or(RegistryError::UnknownPath)?;
        resource.set_value(value);
        if resource.observable && !self.dirty.contains(&path) {
            self.dirty.push(path);
        }
        Ok(())
    }

    /// Drain the pending change notifications: each dirty observable path
    /// paired with a snapshot of its current value.
    pub fn take_dirty(&mut self) -> Vec<(ResourcePath, Vec<u8>)> {
        let dirty = core::mem::take(&mut self.dirty);
        dirty
            .into_iter()
            .filter_map(|path| {
                self.resources
                    .get(&path)
                    .map(|r| (path, r.value().to_vec()))
            })
            .collect()
    }

    /// Iterate all resources in path order (used to assemble the
    /// registration object list).
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scancode() -> Resource {
        Resource::new(
            ResourcePath::new("3202", 0, "5700"),
            "Scancode",
            SemanticType::Str,
            Operations::GET,
            true,
        )
        .with_value(b"0")
    }

    fn color() -> Resource {
        Resource::new(
            ResourcePath::new("3201", 0, "5855"),
            "Color",
            SemanticType::Str,
            Operations::GET_PUT,
            false,
        )
        .with_value(b"red")
    }

    #[test]
    fn get_set_round_trip() {
        let mut reg = ResourceRegistry::new();
        reg.insert(scancode()).unwrap();
        let path = ResourcePath::new("3202", 0, "5700");

        assert_eq!(reg.value(path).unwrap(), b"0");
        reg.set_value(path, b"978020137962").unwrap();
        assert_eq!(reg.value(path).unwrap(), b"978020137962");
    }

    #[test]
    fn duplicate_insert_rejected() {
        let mut reg = ResourceRegistry::new();
        reg.insert(scancode()).unwrap();
        assert_eq!(
            reg.insert(scancode()),
            Err(RegistryError::DuplicatePath)
        );
    }

    #[test]
    fn unknown_path_rejected() {
        let mut reg = ResourceRegistry::new();
        let missing = ResourcePath::new("9999", 0, "1");
        assert_eq!(reg.value(missing), Err(RegistryError::UnknownPath));
        assert_eq!(
            reg.set_value(missing, b"x"),
            Err(RegistryError::UnknownPath)
        );
    }

    #[test]
    fn observable_write_marks_dirty() {
        let mut reg = ResourceRegistry::new();
        reg.insert(scancode()).unwrap();
        let path = ResourcePath::new("3202", 0, "5700");

        reg.set_value(path, b"A").unwrap();
        reg.set_value(path, b"B").unwrap();

        // Coalesced to a single notification carrying the latest value.
        let dirty = reg.take_dirty();
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty[0].0, path);
        assert_eq!(dirty[0].1, b"B");

        // Drained.
        assert!(reg.take_dirty().is_empty());
    }

    #[test]
    fn non_observable_write_stays_clean() {
        let mut reg = ResourceRegistry::new();
        reg.insert(color()).unwrap();
        reg.set_value(ResourcePath::new("3201", 0, "5855"), b"blue")
            .unwrap();
        assert!(reg.take_dirty().is_empty());
    }
}
