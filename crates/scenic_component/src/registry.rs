//! Component type registry.
//!
//! Maps concrete Rust types to the sequential [`ComponentId`]s used by
//! signatures and column storage. The table is built once, during scene init,
//! before any object exists; re-registration is not supported.

use std::any::TypeId;
use std::collections::HashMap;

use tracing::debug;

use crate::component::Component;
use crate::signature::{COMPONENT_CAP, ComponentId};

/// The `TypeId → ComponentId` table for one world.
///
/// Looking up an unregistered type is a contract violation and panics: it
/// signals a registration-order bug, not a runtime condition.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    ids: HashMap<TypeId, ComponentId>,
    names: Vec<&'static str>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` and assigns it the next sequential id.
    ///
    /// # Panics
    ///
    /// Panics if `T` is already registered or the type cap is exceeded.
    pub fn register<T: Component>(&mut self) -> ComponentId {
        assert!(
            self.names.len() < COMPONENT_CAP,
            "component type cap ({COMPONENT_CAP}) exceeded registering {}",
            T::type_name()
        );
        let id = ComponentId(self.names.len() as u16);
        let previous = self.ids.insert(TypeId::of::<T>(), id);
        assert!(
            previous.is_none(),
            "component type {} is already registered",
            T::type_name()
        );
        self.names.push(T::type_name());
        debug!(component = T::type_name(), id = id.0, "component type registered");
        id
    }

    /// Returns the id assigned to `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered.
    #[must_use]
    pub fn id_of<T: Component>(&self) -> ComponentId {
        match self.ids.get(&TypeId::of::<T>()) {
            Some(&id) => id,
            None => panic!("component type {} is not registered", T::type_name()),
        }
    }

    /// Returns `true` if `T` is registered.
    #[must_use]
    pub fn is_registered<T: Component>(&self) -> bool {
        self.ids.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered component types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no type has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Human-readable name of a registered component type.
    #[must_use]
    pub fn name(&self, id: ComponentId) -> &'static str {
        self.names[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Position;
    impl Component for Position {}

    #[derive(Debug, Default)]
    struct Velocity;
    impl Component for Velocity {}

    #[test]
    fn test_ids_are_sequential() {
        let mut registry = ComponentRegistry::new();
        assert_eq!(registry.register::<Position>(), ComponentId(0));
        assert_eq!(registry.register::<Velocity>(), ComponentId(1));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_id_of_returns_assigned_id() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Position>();
        registry.register::<Velocity>();
        assert_eq!(registry.id_of::<Velocity>(), ComponentId(1));
        assert_eq!(registry.id_of::<Position>(), ComponentId(0));
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_reregistration_panics() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Position>();
        registry.register::<Position>();
    }

    #[test]
    #[should_panic(expected = "is not registered")]
    fn test_unregistered_lookup_panics() {
        let registry = ComponentRegistry::new();
        let _ = registry.id_of::<Position>();
    }
}
