//! User-defined capability extensions.
//!
//! An [`Interface`] is a user type that packages reusable game operations on
//! top of the context — spawn helpers, scoring rules, and the like. Interfaces
//! are registered during scene init and reached from systems through
//! [`Context::with_interface`](crate::Context::with_interface), which lends
//! the interface out together with the calling context.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;

/// Marker for user-defined capability extensions.
///
/// Interface methods conventionally take `&mut Context` as an explicit
/// argument, so they act with exactly the capabilities of whichever update
/// invoked them.
pub trait Interface: 'static {}

/// All interfaces registered for one scene, keyed by type.
#[derive(Default)]
pub struct InterfaceSet {
    slots: HashMap<TypeId, Box<dyn Any>>,
}

impl InterfaceSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an interface instance.
    ///
    /// # Panics
    ///
    /// Panics if an interface of the same type is already registered.
    pub fn insert<I: Interface>(&mut self, interface: I) {
        let previous = self.slots.insert(TypeId::of::<I>(), Box::new(interface));
        assert!(
            previous.is_none(),
            "interface {} is already registered",
            type_name::<I>()
        );
    }

    /// Returns `true` if an interface of type `I` is registered.
    #[must_use]
    pub fn contains<I: Interface>(&self) -> bool {
        self.slots.contains_key(&TypeId::of::<I>())
    }

    /// Number of registered interfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no interface is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Removes the slot for `id` so it can be lent out.
    pub(crate) fn take(&mut self, id: TypeId) -> Option<Box<dyn Any>> {
        self.slots.remove(&id)
    }

    /// Returns a lent-out slot.
    pub(crate) fn put(&mut self, id: TypeId, slot: Box<dyn Any>) {
        self.slots.insert(id, slot);
    }
}

impl fmt::Debug for InterfaceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceSet").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Spawner {
        spawned: u32,
    }
    impl Interface for Spawner {}

    #[test]
    fn test_insert_and_contains() {
        let mut set = InterfaceSet::new();
        set.insert(Spawner { spawned: 0 });
        assert!(set.contains::<Spawner>());
        assert_eq!(set.len(), 1);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_duplicate_registration_panics() {
        let mut set = InterfaceSet::new();
        set.insert(Spawner { spawned: 0 });
        set.insert(Spawner { spawned: 1 });
    }

    #[test]
    fn test_take_and_put_round_trip() {
        let mut set = InterfaceSet::new();
        set.insert(Spawner { spawned: 3 });
        let slot = set.take(TypeId::of::<Spawner>()).unwrap();
        assert!(!set.contains::<Spawner>());
        set.put(TypeId::of::<Spawner>(), slot);
        assert!(set.contains::<Spawner>());
    }
}
