//! Type-erased dense component storage.
//!
//! Each registered component type owns one [`DenseColumn<T>`]: a dense
//! `Vec<T>` of instances, an object-id → slot map, and a FIFO free list of
//! vacated slots. Columns sit behind the non-generic [`Column`] trait so the
//! object lifecycle can create and destroy components by [`ComponentId`]
//! without knowing the concrete type; typed access goes through an `Any`
//! downcast selected by the registry.
//!
//! Slot reuse means array indices are *not* stable identifiers — every access
//! resolves through the slot map, and slot indices must never be cached
//! across frames.

use std::any::Any;
use std::collections::{HashMap, VecDeque};

use crate::component::Component;
use crate::object::Object;
use crate::registry::ComponentRegistry;
use crate::signature::ComponentId;

/// Non-generic face of a per-type component column.
///
/// Only id-based lifetime operations are exposed here; typed reads and writes
/// downcast to the concrete [`DenseColumn`] via [`Column::as_any`].
pub trait Column {
    /// Allocates a default-valued instance for `object`, reusing a free slot
    /// when one is available.
    fn create(&mut self, object: Object);

    /// Resets `object`'s slot to the default value and releases it.
    fn destroy(&mut self, object: Object);

    /// Returns `true` if `object` has a live instance in this column.
    fn has(&self, object: Object) -> bool;

    /// Number of live instances.
    fn len(&self) -> usize;

    /// Returns `true` if the column holds no live instances.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upcast for typed access.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed access.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Dense storage for one component type.
#[derive(Debug)]
pub struct DenseColumn<T: Component> {
    items: Vec<T>,
    slot_of: HashMap<Object, usize>,
    free: VecDeque<usize>,
}

impl<T: Component> DenseColumn<T> {
    /// Creates an empty column.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            slot_of: HashMap::new(),
            free: VecDeque::new(),
        }
    }

    fn slot(&self, object: Object) -> usize {
        match self.slot_of.get(&object) {
            Some(&slot) => slot,
            None => panic!("{object} has no live {} component", T::type_name()),
        }
    }

    /// Returns a reference to `object`'s instance.
    ///
    /// # Panics
    ///
    /// Panics if `object` has no live instance — a signature contract
    /// violation in the caller.
    #[must_use]
    pub fn get(&self, object: Object) -> &T {
        &self.items[self.slot(object)]
    }

    /// Returns a mutable reference to `object`'s instance.
    ///
    /// # Panics
    ///
    /// Panics if `object` has no live instance.
    #[must_use]
    pub fn get_mut(&mut self, object: Object) -> &mut T {
        let slot = self.slot(object);
        &mut self.items[slot]
    }
}

impl<T: Component> Default for DenseColumn<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> Column for DenseColumn<T> {
    fn create(&mut self, object: Object) {
        debug_assert!(
            !self.slot_of.contains_key(&object),
            "{object} already has a {} component",
            T::type_name()
        );
        let slot = match self.free.pop_front() {
            Some(slot) => {
                self.items[slot] = T::default();
                slot
            }
            None => {
                self.items.push(T::default());
                self.items.len() - 1
            }
        };
        self.slot_of.insert(object, slot);
    }

    fn destroy(&mut self, object: Object) {
        let slot = match self.slot_of.remove(&object) {
            Some(slot) => slot,
            None => panic!("{object} has no live {} component to destroy", T::type_name()),
        };
        self.items[slot] = T::default();
        self.free.push_back(slot);
    }

    fn has(&self, object: Object) -> bool {
        self.slot_of.contains_key(&object)
    }

    fn len(&self) -> usize {
        self.slot_of.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// All component columns of one world, plus the registry that indexes them.
///
/// Registration pushes one column per type, so `columns[id.index()]` is the
/// column for `id` by construction.
#[derive(Default)]
pub struct ComponentStore {
    registry: ComponentRegistry,
    columns: Vec<Box<dyn Column>>,
}

impl ComponentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` and allocates its column.
    pub fn register<T: Component>(&mut self) -> ComponentId {
        let id = self.registry.register::<T>();
        self.columns.push(Box::new(DenseColumn::<T>::new()));
        id
    }

    /// The registry backing this store.
    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Returns the id assigned to `T`, panicking if unregistered.
    #[must_use]
    pub fn id_of<T: Component>(&self) -> ComponentId {
        self.registry.id_of::<T>()
    }

    /// Number of registered component types.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.registry.len()
    }

    /// Creates a default-valued instance of component `id` for `object`.
    pub fn create(&mut self, id: ComponentId, object: Object) {
        self.columns[id.index()].create(object);
    }

    /// Destroys `object`'s instance of component `id`.
    pub fn destroy(&mut self, id: ComponentId, object: Object) {
        self.columns[id.index()].destroy(object);
    }

    /// Returns `true` if `object` has a live instance of component `id`.
    #[must_use]
    pub fn has(&self, id: ComponentId, object: Object) -> bool {
        self.columns[id.index()].has(object)
    }

    /// Typed read access to `object`'s `T` instance.
    #[must_use]
    pub fn get<T: Component>(&self, object: Object) -> &T {
        let id = self.registry.id_of::<T>();
        self.column::<T>(id).get(object)
    }

    /// Typed write access to `object`'s `T` instance.
    #[must_use]
    pub fn get_mut<T: Component>(&mut self, object: Object) -> &mut T {
        let id = self.registry.id_of::<T>();
        self.column_mut::<T>(id).get_mut(object)
    }

    fn column<T: Component>(&self, id: ComponentId) -> &DenseColumn<T> {
        self.columns[id.index()]
            .as_any()
            .downcast_ref::<DenseColumn<T>>()
            .expect("column type matches the registry entry")
    }

    fn column_mut<T: Component>(&mut self, id: ComponentId) -> &mut DenseColumn<T> {
        self.columns[id.index()]
            .as_any_mut()
            .downcast_mut::<DenseColumn<T>>()
            .expect("column type matches the registry entry")
    }
}
