//! The per-scene runtime container.
//!
//! A [`World`] ties the pieces together: the component store and registry,
//! object identity (allocator + signature table + liveness), named object
//! definitions, the query cache, both singleton tiers, and the event flags.
//! One world exists per scene run; a scene switch tears it down and builds a
//! fresh one with the same persistent singleton handle attached.

use std::collections::HashMap;

use tracing::debug;

use scenic_component::{
    Component, ComponentSet, ComponentStore, Object, ObjectAllocator, Signature,
};

use crate::error::WorldError;
use crate::events::EventFlags;
use crate::query::QueryCache;
use crate::singleton::{SharedSingletons, SingletonSet};

/// One scene's objects, components, groups, tags, singletons, and events.
pub struct World {
    store: ComponentStore,
    allocator: ObjectAllocator,
    /// Indexed by object id; cleared to [`Signature::EMPTY`] on destroy.
    signatures: Vec<Signature>,
    /// Indexed by object id. Guards against destroying an id twice when two
    /// deferred queues name the same object in one frame.
    live: Vec<bool>,
    definitions: HashMap<String, Signature>,
    queries: QueryCache,
    singletons: SingletonSet,
    persistent: SharedSingletons,
    events: EventFlags,
}

impl World {
    /// Creates a world with its own empty persistent tier.
    #[must_use]
    pub fn new() -> Self {
        Self::with_persistent(SharedSingletons::new())
    }

    /// Creates a world attached to an existing persistent singleton tier.
    #[must_use]
    pub fn with_persistent(persistent: SharedSingletons) -> Self {
        Self {
            store: ComponentStore::new(),
            allocator: ObjectAllocator::new(),
            signatures: Vec::new(),
            live: Vec::new(),
            definitions: HashMap::new(),
            queries: QueryCache::new(),
            singletons: SingletonSet::new(),
            persistent,
            events: EventFlags::default(),
        }
    }

    // -- Registration (scene init only) --

    /// Registers the component types in `S`, assigning sequential ids.
    ///
    /// # Panics
    ///
    /// Panics if any object has already been created, or on re-registration.
    pub fn register_components<S: ComponentSet>(&mut self) {
        assert!(
            self.allocator.slots() == 0,
            "component types must be registered before any object is created"
        );
        S::register(&mut self.store);
    }

    /// Records a named object-type template covering the types in `S`.
    pub fn define_object<S: ComponentSet>(&mut self, name: impl Into<String>) {
        let signature = S::signature(&self.store);
        let name = name.into();
        debug!(definition = %name, "object definition recorded");
        self.definitions.insert(name, signature);
    }

    // -- Object lifecycle --

    /// Instantiates an object from the named template.
    ///
    /// Recycles a vacated id when one is available, stamps the template's
    /// signature, creates a default-valued instance of every listed
    /// component, and folds the object into every existing matching group.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownDefinition`] if no template was recorded
    /// under `name`.
    pub fn create_object(&mut self, name: &str) -> Result<Object, WorldError> {
        let signature = *self
            .definitions
            .get(name)
            .ok_or_else(|| WorldError::UnknownDefinition(name.to_string()))?;

        let object = self.allocator.allocate();
        if object.index() == self.signatures.len() {
            self.signatures.push(signature);
            self.live.push(true);
        } else {
            self.signatures[object.index()] = signature;
            self.live[object.index()] = true;
        }

        for component in signature.iter() {
            self.store.create(component, object);
        }
        self.queries.on_created(object, &signature);
        Ok(object)
    }

    /// Destroys an object: every live component per its current signature,
    /// its group and tag memberships, and its signature; the id returns to
    /// the free list. Destroying an already-dead id is a no-op.
    pub fn destroy_object(&mut self, object: Object) {
        if !self.is_live(object) {
            return;
        }
        let signature = self.signatures[object.index()];
        for component in signature.iter() {
            self.store.destroy(component, object);
        }
        self.queries.on_destroyed(object, &signature);
        self.signatures[object.index()] = Signature::EMPTY;
        self.live[object.index()] = false;
        self.allocator.release(object);
    }

    /// Returns `true` if `object` refers to a live (not destroyed) object.
    #[must_use]
    pub fn is_live(&self, object: Object) -> bool {
        self.live.get(object.index()).copied().unwrap_or(false)
    }

    /// Number of live objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.live.iter().filter(|live| **live).count()
    }

    // -- Component access --

    /// Reads `object`'s `T` component.
    ///
    /// # Panics
    ///
    /// Panics if `T`'s bit is not set in `object`'s signature — a contract
    /// violation, since systems must query only objects known to match.
    #[must_use]
    pub fn component<T: Component>(&self, object: Object) -> &T {
        self.store.get::<T>(object)
    }

    /// Writes `object`'s `T` component.
    ///
    /// # Panics
    ///
    /// Panics if `T`'s bit is not set in `object`'s signature.
    #[must_use]
    pub fn component_mut<T: Component>(&mut self, object: Object) -> &mut T {
        self.store.get_mut::<T>(object)
    }

    /// Returns `true` if `object` is live and its signature includes `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self, object: Object) -> bool {
        self.is_live(object) && self.signatures[object.index()].contains(self.store.id_of::<T>())
    }

    // -- Queries --

    /// Objects whose signature is a superset of the types in `S`, in the
    /// cached set's identity order.
    pub fn objects_with<S: ComponentSet>(&mut self) -> Vec<Object> {
        let signature = S::signature(&self.store);
        self.objects_matching(signature)
    }

    /// Objects whose signature is a superset of `signature`.
    ///
    /// The first request for a signature seeds its group by scanning all live
    /// objects; later requests return the incrementally-maintained set. The
    /// returned snapshot stays valid while the caller mutates or queues
    /// destructions.
    pub fn objects_matching(&mut self, signature: Signature) -> Vec<Object> {
        let signatures = &self.signatures;
        let live = &self.live;
        let members = self.queries.group(
            signature,
            signatures.iter().enumerate().filter_map(|(index, object_signature)| {
                live[index].then_some((Object::from_raw(index as u32), *object_signature))
            }),
        );
        members.iter().copied().collect()
    }

    /// Objects currently carrying `tag`, in identity order.
    #[must_use]
    pub fn objects_with_tag(&self, tag: &str) -> Vec<Object> {
        self.queries
            .tagged(tag)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Adds `object` to the named tag set.
    pub fn add_tag(&mut self, object: Object, tag: impl Into<String>) {
        self.queries.add_tag(object, tag);
    }

    /// Removes `object` from the named tag set.
    pub fn remove_tag(&mut self, object: Object, tag: &str) {
        self.queries.remove_tag(object, tag);
    }

    // -- Singletons --

    /// Creates a default-valued scene-scoped singleton.
    pub fn create_singleton<T: Default + 'static>(&mut self) {
        self.singletons.create::<T>();
    }

    /// Inserts a pre-built scene-scoped singleton.
    pub fn insert_singleton<T: 'static>(&mut self, value: T) {
        self.singletons.insert(value);
    }

    /// Reads the scene-scoped singleton of type `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never created for this scene.
    #[must_use]
    pub fn singleton<T: 'static>(&self) -> &T {
        self.singletons.get::<T>()
    }

    /// Writes the scene-scoped singleton of type `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never created for this scene.
    #[must_use]
    pub fn singleton_mut<T: 'static>(&mut self) -> &mut T {
        self.singletons.get_mut::<T>()
    }

    /// The persistent singleton tier attached to this world.
    #[must_use]
    pub fn persistent(&self) -> &SharedSingletons {
        &self.persistent
    }

    // -- Events --

    /// The scene's quit/switch flags.
    #[must_use]
    pub fn events(&self) -> &EventFlags {
        &self.events
    }

    /// Mutable access to the scene's quit/switch flags.
    pub fn events_mut(&mut self) -> &mut EventFlags {
        &mut self.events
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }
    impl Component for Position {}

    #[derive(Debug, Default, PartialEq)]
    struct Velocity {
        x: f32,
        y: f32,
    }
    impl Component for Velocity {}

    #[derive(Debug, Default)]
    struct Spin {
        rate: f32,
    }
    impl Component for Spin {}

    fn ball_world() -> World {
        let mut world = World::new();
        world.register_components::<(Position, Velocity, Spin)>();
        world.define_object::<(Position, Velocity)>("ball");
        world.define_object::<(Position, Velocity, Spin)>("top");
        world.define_object::<(Position,)>("anchor");
        world
    }

    #[test]
    fn test_component_readable_iff_in_signature() {
        let mut world = ball_world();
        let ball = world.create_object("ball").unwrap();
        assert!(world.has_component::<Position>(ball));
        assert!(world.has_component::<Velocity>(ball));
        assert!(!world.has_component::<Spin>(ball));
        // Readable for every set bit.
        let _ = world.component::<Position>(ball);
        let _ = world.component::<Velocity>(ball);
    }

    #[test]
    #[should_panic(expected = "has no live")]
    fn test_component_outside_signature_panics() {
        let mut world = ball_world();
        let ball = world.create_object("ball").unwrap();
        let _ = world.component::<Spin>(ball);
    }

    #[test]
    fn test_unknown_definition_is_an_error() {
        let mut world = ball_world();
        let err = world.create_object("meteor").unwrap_err();
        assert!(matches!(err, WorldError::UnknownDefinition(name) if name == "meteor"));
    }

    #[test]
    fn test_recycled_id_sees_default_components() {
        // Create, query, destroy, query, recreate: the new occupant of a
        // recycled id must only ever see default component values.
        let mut world = ball_world();
        let ball = world.create_object("ball").unwrap();
        world.component_mut::<Position>(ball).x = 99.0;

        assert_eq!(world.objects_with::<(Position,)>(), vec![ball]);

        world.destroy_object(ball);
        assert!(world.objects_with::<(Position,)>().is_empty());
        assert!(!world.is_live(ball));

        let reborn = world.create_object("ball").unwrap();
        assert_eq!(reborn, ball, "vacated id is recycled");
        assert_eq!(world.component::<Position>(reborn), &Position::default());
    }

    #[test]
    fn test_cached_groups_agree_with_rescans() {
        let mut world = ball_world();

        // Seed the group before any objects exist.
        assert!(world.objects_with::<(Position, Velocity)>().is_empty());

        let mut balls = Vec::new();
        for _ in 0..3 {
            balls.push(world.create_object("ball").unwrap());
        }
        world.create_object("top").unwrap();
        world.create_object("anchor").unwrap();

        let rescan = |world: &mut World| -> Vec<Object> {
            let signature = <(Position, Velocity)>::signature(&world.store);
            (0..world.signatures.len() as u32)
                .map(Object::from_raw)
                .filter(|o| world.is_live(*o) && world.signatures[o.index()].contains_all(&signature))
                .collect()
        };

        assert_eq!(world.objects_with::<(Position, Velocity)>(), rescan(&mut world));

        world.destroy_object(balls[1]);
        assert_eq!(world.objects_with::<(Position, Velocity)>(), rescan(&mut world));

        world.create_object("ball").unwrap();
        assert_eq!(world.objects_with::<(Position, Velocity)>(), rescan(&mut world));
    }

    #[test]
    fn test_group_created_after_objects_seeds_by_scan() {
        let mut world = ball_world();
        let a = world.create_object("ball").unwrap();
        let b = world.create_object("top").unwrap();
        world.create_object("anchor").unwrap();

        // First query happens after the fact; the seed scan must find both.
        assert_eq!(world.objects_with::<(Velocity,)>(), vec![a, b]);
        assert_eq!(world.objects_with::<(Spin,)>(), vec![b]);
    }

    #[test]
    fn test_tags_do_not_touch_signatures_or_groups() {
        let mut world = ball_world();
        let ball = world.create_object("ball").unwrap();
        let before = world.objects_with::<(Position, Velocity)>();

        world.add_tag(ball, "hazard");
        world.add_tag(ball, "glowing");
        assert_eq!(world.objects_with::<(Position, Velocity)>(), before);
        assert!(!world.has_component::<Spin>(ball));
        assert_eq!(world.objects_with_tag("hazard"), vec![ball]);

        world.remove_tag(ball, "glowing");
        assert!(world.objects_with_tag("glowing").is_empty());
        assert_eq!(world.objects_with_tag("hazard"), vec![ball]);
    }

    #[test]
    fn test_destroy_clears_every_tag_membership() {
        let mut world = ball_world();
        let ball = world.create_object("ball").unwrap();
        world.add_tag(ball, "hazard");
        world.add_tag(ball, "scored");
        world.destroy_object(ball);
        assert!(world.objects_with_tag("hazard").is_empty());
        assert!(world.objects_with_tag("scored").is_empty());
    }

    #[test]
    fn test_destroying_dead_id_is_a_no_op() {
        let mut world = ball_world();
        let ball = world.create_object("ball").unwrap();
        world.destroy_object(ball);
        world.destroy_object(ball);
        assert_eq!(world.object_count(), 0);
        // The free list holds the id exactly once even after the double call.
        let reborn = world.create_object("ball").unwrap();
        assert_eq!(reborn, ball);
        let fresh = world.create_object("ball").unwrap();
        assert_ne!(fresh, ball);
    }

    #[test]
    #[should_panic(expected = "before any object is created")]
    fn test_registration_after_objects_panics() {
        let mut world = ball_world();
        world.create_object("ball").unwrap();
        world.register_components::<(Position,)>();
    }

    #[test]
    fn test_unknown_tag_query_is_empty() {
        let world = ball_world();
        assert!(world.objects_with_tag("nobody").is_empty());
    }

    #[test]
    fn test_scene_singletons_live_on_the_world() {
        #[derive(Debug, Default)]
        struct Clock {
            frame: u64,
        }
        let mut world = World::new();
        world.create_singleton::<Clock>();
        world.singleton_mut::<Clock>().frame = 12;
        assert_eq!(world.singleton::<Clock>().frame, 12);
    }

    #[test]
    fn test_persistent_tier_survives_world_replacement() {
        #[derive(Debug, Default)]
        struct Tally {
            total: u32,
        }
        let persistent = SharedSingletons::new();
        persistent.create::<Tally>();

        let first = World::with_persistent(persistent.clone());
        first.persistent().get_mut::<Tally>().total = 5;
        drop(first);

        let second = World::with_persistent(persistent.clone());
        assert_eq!(second.persistent().get::<Tally>().total, 5);
    }
}
