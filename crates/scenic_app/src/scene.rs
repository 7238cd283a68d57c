//! Scene lifecycle and the frame-loop driver.
//!
//! A [`Stage`] hosts one scene run: the world, the registered systems and
//! interfaces, and the frame loop. Its lifecycle is the scene state machine
//! `Uninitialized → Init → Running → Terminated`; registration operations are
//! only legal during `Init`, and the frame loop drives `Running` until a
//! quit or switch-scene request ends it.
//!
//! Each frame runs every default system in registration order and flushes
//! that system's queued destructions immediately after its update returns;
//! the quit/switch flags are checked only after all systems have run.

use std::cell::{Ref, RefMut};
use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use scenic_component::{Component, ComponentSet, Object};
use scenic_world::{SharedSingletons, World, WorldError};

use crate::context::{Context, DestroyQueue};
use crate::error::GameError;
use crate::interface::{Interface, InterfaceSet};
use crate::system::System;

/// Frame pacing for a running scene.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Target frames per second.
    pub frame_rate: f64,
    /// Maximum number of frames to run (0 = until quit/switch). A nonzero
    /// bound ends the run as if quit had been requested.
    pub max_frames: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            max_frames: 0,
        }
    }
}

/// Lifecycle of one scene run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    /// Constructed, registration not yet open.
    Uninitialized,
    /// Registration and initial object setup are legal.
    Init,
    /// The frame loop is executing.
    Running,
    /// The run ended; the stage is inert.
    Terminated,
}

/// Why a scene's frame loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Quit was requested (or the frame budget ran out).
    Quit,
    /// A switch to the named scene was requested.
    Switch(String),
}

/// A scene definition: registration plus optional teardown.
///
/// The game constructs a fresh [`Stage`] for every run of a scene, so `init`
/// is called again after each switch back.
pub trait Scene {
    /// Registers component types, definitions, systems, interfaces, and
    /// singletons, and creates the scene's initial objects.
    ///
    /// # Errors
    ///
    /// Errors abort the run before the frame loop starts.
    fn init(&mut self, stage: &mut Stage) -> Result<(), GameError>;

    /// Teardown hook, called after the frame loop ends.
    ///
    /// # Errors
    ///
    /// Errors propagate out of the game loop.
    fn quit(&mut self, _stage: &mut Stage) -> Result<(), GameError> {
        Ok(())
    }
}

/// Hosts one scene run: world, systems, interfaces, and the frame loop.
pub struct Stage {
    world: World,
    systems: Vec<Box<dyn System>>,
    batches: HashMap<String, Vec<Box<dyn System>>>,
    interfaces: InterfaceSet,
    state: SceneState,
    frame: u64,
}

impl Stage {
    /// Creates a stage attached to the given persistent singleton tier.
    #[must_use]
    pub fn new(persistent: SharedSingletons) -> Self {
        Self {
            world: World::with_persistent(persistent),
            systems: Vec::new(),
            batches: HashMap::new(),
            interfaces: InterfaceSet::new(),
            state: SceneState::Uninitialized,
            frame: 0,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SceneState {
        self.state
    }

    /// Opens the registration window. Normally driven by [`Game`].
    ///
    /// [`Game`]: crate::Game
    pub fn begin_init(&mut self) {
        assert!(
            self.state == SceneState::Uninitialized,
            "begin_init requires a fresh stage (state: {:?})",
            self.state
        );
        self.state = SceneState::Init;
    }

    fn assert_init(&self, operation: &str) {
        assert!(
            self.state == SceneState::Init,
            "{operation} is only allowed during scene init (state: {:?})",
            self.state
        );
    }

    // -- Registration (Init only) --

    /// Registers the component types in `S`.
    pub fn register_components<S: ComponentSet>(&mut self) {
        self.assert_init("register_components");
        self.world.register_components::<S>();
    }

    /// Records a named object-type template covering the types in `S`.
    pub fn define_object<S: ComponentSet>(&mut self, name: impl Into<String>) {
        self.assert_init("define_object");
        self.world.define_object::<S>(name);
    }

    /// Registers a system into the frame loop, after all already-registered
    /// systems.
    pub fn register_system(&mut self, system: impl System + 'static) {
        self.assert_init("register_system");
        self.systems.push(Box::new(system));
    }

    /// Registers a system into the named batch instead of the frame loop.
    ///
    /// Batches are run manually through [`Stage::run_batch`].
    pub fn register_system_in_batch(&mut self, batch: impl Into<String>, system: impl System + 'static) {
        self.assert_init("register_system_in_batch");
        self.batches.entry(batch.into()).or_default().push(Box::new(system));
    }

    /// Registers a user interface instance.
    pub fn register_interface(&mut self, interface: impl Interface) {
        self.assert_init("register_interface");
        self.interfaces.insert(interface);
    }

    /// Creates a default-valued scene-scoped singleton.
    pub fn create_singleton<T: Default + 'static>(&mut self) {
        self.assert_init("create_singleton");
        self.world.create_singleton::<T>();
    }

    /// Inserts a pre-built scene-scoped singleton.
    pub fn insert_singleton<T: 'static>(&mut self, value: T) {
        self.assert_init("insert_singleton");
        self.world.insert_singleton(value);
    }

    // -- Setup and inspection (valid in Init and after) --

    /// Instantiates an object from the named template.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownDefinition`] for unrecorded names.
    pub fn create_object(&mut self, name: &str) -> Result<Object, WorldError> {
        self.world.create_object(name)
    }

    /// Adds `object` to the named tag set.
    pub fn add_tag(&mut self, object: Object, tag: impl Into<String>) {
        self.world.add_tag(object, tag);
    }

    /// Writes `object`'s `T` component (initial values during setup).
    #[must_use]
    pub fn component_mut<T: Component>(&mut self, object: Object) -> &mut T {
        self.world.component_mut::<T>(object)
    }

    /// Reads `object`'s `T` component.
    #[must_use]
    pub fn component<T: Component>(&self, object: Object) -> &T {
        self.world.component::<T>(object)
    }

    /// Objects whose signature covers the types in `S`.
    pub fn objects_with<S: ComponentSet>(&mut self) -> Vec<Object> {
        self.world.objects_with::<S>()
    }

    /// Objects currently carrying `tag`.
    #[must_use]
    pub fn objects_with_tag(&self, tag: &str) -> Vec<Object> {
        self.world.objects_with_tag(tag)
    }

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
    #[must_use]
    pub fn persistent_mut<T: 'static>(&self) -> RefMut<'_, T> {
        self.world.persistent().get_mut::<T>()
    }

    // -- Execution --

    /// Runs the frame loop until a quit or switch-scene request (or the
    /// configured frame budget) ends it.
    ///
    /// # Errors
    ///
    /// Propagates the first system error; the run is aborted.
    ///
    /// # Panics
    ///
    /// Panics unless the stage is in the `Init` state (registration done,
    /// loop not yet started).
    pub fn run(&mut self, config: &FrameConfig) -> Result<Outcome, GameError> {
        assert!(
            self.state == SceneState::Init,
            "run requires an initialized scene (state: {:?})",
            self.state
        );
        self.state = SceneState::Running;

        let frame_duration = Duration::from_secs_f64(1.0 / config.frame_rate);
        let dt = frame_duration.as_secs_f32();
        info!(
            systems = self.systems.len(),
            frame_rate = config.frame_rate,
            "scene running"
        );

        let outcome = loop {
            let started = Instant::now();
            self.frame += 1;
            self.run_systems_once(dt)?;

            if let Some(outcome) = self.pending_outcome() {
                break outcome;
            }
            if config.max_frames > 0 && self.frame >= config.max_frames {
                debug!(frames = self.frame, "frame budget reached");
                break Outcome::Quit;
            }

            let elapsed = started.elapsed();
            if elapsed < frame_duration {
                std::thread::sleep(frame_duration - elapsed);
            } else {
                warn!(
                    frame = self.frame,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = frame_duration.as_millis() as u64,
                    "frame exceeded time budget"
                );
            }
        };

        self.state = SceneState::Terminated;
        info!(frames = self.frame, ?outcome, "scene stopped");
        Ok(outcome)
    }

    fn run_systems_once(&mut self, dt: f32) -> Result<(), GameError> {
        let Self {
            world,
            systems,
            interfaces,
            frame,
            ..
        } = self;
        for system in systems.iter_mut() {
            let mut pending = DestroyQueue::new();
            let mut ctx = Context::new(world, interfaces, &mut pending, *frame, dt);
            system.update(&mut ctx)?;
            for object in pending.take() {
                world.destroy_object(object);
            }
        }
        Ok(())
    }

    /// Runs one pass of the named batch, flushing each system's queued
    /// destructions, and reports whether a quit or switch-scene request is
    /// now pending.
    ///
    /// An unknown batch name runs zero systems. Batches exist for
    /// applications that drive a scene manually instead of through
    /// [`Stage::run`]; the frame counter is not advanced.
    ///
    /// # Errors
    ///
    /// Propagates the first system error.
    pub fn run_batch(&mut self, batch: &str, dt: f32) -> Result<bool, GameError> {
        assert!(
            matches!(self.state, SceneState::Init | SceneState::Running),
            "run_batch requires an initialized scene (state: {:?})",
            self.state
        );
        let Self {
            world,
            batches,
            interfaces,
            frame,
            ..
        } = self;
        if let Some(systems) = batches.get_mut(batch) {
            for system in systems.iter_mut() {
                let mut pending = DestroyQueue::new();
                let mut ctx = Context::new(world, interfaces, &mut pending, *frame, dt);
                system.update(&mut ctx)?;
                for object in pending.take() {
                    world.destroy_object(object);
                }
            }
        }
        let events = world.events();
        Ok(events.quit_requested() || events.switch_requested().is_some())
    }

    fn pending_outcome(&self) -> Option<Outcome> {
        let events = self.world.events();
        if events.quit_requested() {
            return Some(Outcome::Quit);
        }
        events
            .switch_requested()
            .map(|target| Outcome::Switch(target.to_string()))
    }
}
