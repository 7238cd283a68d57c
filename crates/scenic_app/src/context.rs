//! The capability-scoped mutation façade.
//!
//! A [`Context`] is constructed by the stage driver for the duration of one
//! system (or batch) update. It exposes the bounded set of operations an
//! update is allowed: object creation and tagging, deferred destruction,
//! structural and tag queries, component reads/writes, singleton access,
//! interface access, and the quit/switch-scene requests. Component type
//! registration and raw id enumeration are deliberately absent.
//!
//! Destruction is never applied mid-update: [`Context::destroy_object`] only
//! records the request in the driver-owned [`DestroyQueue`], which the driver
//! flushes after the update returns. That is what makes it safe for an update
//! to iterate a query result and request destruction of its members.

use std::any::TypeId;
use std::cell::{Ref, RefMut};
use std::collections::BTreeSet;

use scenic_component::{Component, ComponentSet, Object};
use scenic_world::{World, WorldError};

use crate::interface::{Interface, InterfaceSet};

/// Object destructions requested during an update.
///
/// A set, not a list: requesting the same object twice in one update is one
/// destruction.
#[derive(Debug, Default)]
pub struct DestroyQueue {
    pending: BTreeSet<Object>,
}

impl DestroyQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a destruction request.
    pub fn push(&mut self, object: Object) {
        self.pending.insert(object);
    }

    /// Number of distinct objects queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Empties the queue, yielding the requests in identity order.
    pub fn take(&mut self) -> BTreeSet<Object> {
        std::mem::take(&mut self.pending)
    }
}

/// Everything a system or interface may do during one update.
pub struct Context<'a> {
    world: &'a mut World,
    interfaces: &'a mut InterfaceSet,
    pending: &'a mut DestroyQueue,
    frame: u64,
    dt: f32,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        world: &'a mut World,
        interfaces: &'a mut InterfaceSet,
        pending: &'a mut DestroyQueue,
        frame: u64,
        dt: f32,
    ) -> Self {
        Self {
            world,
            interfaces,
            pending,
            frame,
            dt,
        }
    }

    /// The current frame counter (1-based; 0 outside the frame loop).
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Fixed timestep for this run, in seconds.
    #[must_use]
    pub fn dt(&self) -> f32 {
        self.dt
    }

    // -- Object lifecycle --

    /// Instantiates an object from the named template.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownDefinition`] for unrecorded names.
    pub fn create_object(&mut self, name: &str) -> Result<Object, WorldError> {
        self.world.create_object(name)
    }

    /// Queues `object` for destruction.
    ///
    /// The destruction is applied by the driver after this update returns;
    /// query results already in hand are unaffected until then.
    pub fn destroy_object(&mut self, object: Object) {
        self.pending.push(object);
    }

    /// Adds `object` to the named tag set.
    pub fn add_tag(&mut self, object: Object, tag: impl Into<String>) {
        self.world.add_tag(object, tag);
    }

    /// Removes `object` from the named tag set.
    pub fn remove_tag(&mut self, object: Object, tag: &str) {
        self.world.remove_tag(object, tag);
    }

    // -- Queries --

    /// Objects whose signature covers the types in `S`.
    pub fn objects_with<S: ComponentSet>(&mut self) -> Vec<Object> {
        self.world.objects_with::<S>()
    }

    /// Objects currently carrying `tag`.
    #[must_use]
    pub fn objects_with_tag(&self, tag: &str) -> Vec<Object> {
        self.world.objects_with_tag(tag)
    }

    // -- Components --

    /// Reads `object`'s `T` component. Panics outside the signature.
    #[must_use]
    pub fn component<T: Component>(&self, object: Object) -> &T {
        self.world.component::<T>(object)
    }

    /// Writes `object`'s `T` component. Panics outside the signature.
    #[must_use]
    pub fn component_mut<T: Component>(&mut self, object: Object) -> &mut T {
        self.world.component_mut::<T>(object)
    }

    // -- Singletons --

    /// Reads the scene-scoped singleton of type `T`.
    #[must_use]
    pub fn singleton<T: 'static>(&self) -> &T {
        self.world.singleton::<T>()
    }

    /// Writes the scene-scoped singleton of type `T`.
    #[must_use]
    pub fn singleton_mut<T: 'static>(&mut self) -> &mut T {
        self.world.singleton_mut::<T>()
    }

    /// Borrows the persistent singleton of type `T`.
    #[must_use]
    pub fn persistent<T: 'static>(&self) -> Ref<'_, T> {
        self.world.persistent().get::<T>()
    }

    /// Mutably borrows the persistent singleton of type `T`.
    ///
    /// Runtime-checked: release the borrow before requesting another for the
    /// same tier.
    #[must_use]
    pub fn persistent_mut<T: 'static>(&self) -> RefMut<'_, T> {
        self.world.persistent().get_mut::<T>()
    }

    // -- Interfaces --

    /// Lends out the registered interface of type `I` together with this
    /// context.
    ///
    /// The interface is removed from its slot for the duration of the call,
    /// so its methods can freely take `&mut Context`. Destructions the
    /// interface requests land in the same queue as the calling update's.
    ///
    /// # Panics
    ///
    /// Panics if `I` was never registered, or if this call is nested inside
    /// another `with_interface::<I>` invocation.
    pub fn with_interface<I: Interface, R>(
        &mut self,
        f: impl FnOnce(&mut I, &mut Context<'a>) -> R,
    ) -> R {
        let mut slot = self.interfaces.take(TypeId::of::<I>()).unwrap_or_else(|| {
            panic!(
                "interface {} is not registered (or is already in use)",
                std::any::type_name::<I>()
            )
        });
        let interface = slot
            .downcast_mut::<I>()
            .expect("interface slot holds the registered type");
        let result = f(interface, self);
        self.interfaces.put(TypeId::of::<I>(), slot);
        result
    }

    // -- Control --

    /// Requests that the game quit at the end of this frame.
    pub fn quit(&mut self) {
        self.world.events_mut().request_quit();
    }

    /// Requests a switch to the named scene at the end of this frame.
    pub fn switch_scene(&mut self, scene: &str) {
        self.world.events_mut().request_switch(scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Marker;
    impl Component for Marker {}

    struct Spawner {
        spawned: u32,
    }
    impl Interface for Spawner {}

    fn fixture() -> (World, InterfaceSet, DestroyQueue) {
        let mut world = World::new();
        world.register_components::<(Marker,)>();
        world.define_object::<(Marker,)>("thing");
        let mut interfaces = InterfaceSet::new();
        interfaces.insert(Spawner { spawned: 0 });
        (world, interfaces, DestroyQueue::new())
    }

    #[test]
    fn test_destroy_is_queued_not_applied() {
        let (mut world, mut interfaces, mut pending) = fixture();
        let mut ctx = Context::new(&mut world, &mut interfaces, &mut pending, 1, 0.016);
        let thing = ctx.create_object("thing").unwrap();
        ctx.destroy_object(thing);
        // Still live and still queried until the driver flushes.
        assert_eq!(ctx.objects_with::<(Marker,)>(), vec![thing]);
        drop(ctx);
        assert_eq!(pending.len(), 1);
        assert!(world.is_live(thing));
    }

    #[test]
    fn test_queue_deduplicates_requests() {
        let (mut world, mut interfaces, mut pending) = fixture();
        let mut ctx = Context::new(&mut world, &mut interfaces, &mut pending, 1, 0.016);
        let thing = ctx.create_object("thing").unwrap();
        ctx.destroy_object(thing);
        ctx.destroy_object(thing);
        drop(ctx);
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn test_with_interface_shares_the_context() {
        let (mut world, mut interfaces, mut pending) = fixture();
        let mut ctx = Context::new(&mut world, &mut interfaces, &mut pending, 1, 0.016);
        let created = ctx.with_interface::<Spawner, _>(|spawner, ctx| {
            spawner.spawned += 1;
            ctx.create_object("thing").unwrap()
        });
        assert_eq!(ctx.objects_with::<(Marker,)>(), vec![created]);
        // State mutated through the lease persists after the call.
        ctx.with_interface::<Spawner, _>(|spawner, _| {
            assert_eq!(spawner.spawned, 1);
        });
    }

    #[test]
    #[should_panic(expected = "is not registered")]
    fn test_unregistered_interface_panics() {
        struct Absent;
        impl Interface for Absent {}
        let (mut world, mut interfaces, mut pending) = fixture();
        let mut ctx = Context::new(&mut world, &mut interfaces, &mut pending, 1, 0.016);
        ctx.with_interface::<Absent, _>(|_, _| {});
    }
}
