//! The top-level game runtime.
//!
//! A [`Game`] owns the name → scene registry and the persistent singleton
//! tier. [`Game::start`] runs the named scene and then loops the scene-switch
//! handoff: each switch tears the old stage down, builds a fresh one with the
//! persistent tier re-attached, and starts the target scene, until a terminal
//! quit is requested.

use std::cell::{Ref, RefMut};
use std::collections::HashMap;

use tracing::info;

use scenic_world::SharedSingletons;

use crate::error::GameError;
use crate::scene::{FrameConfig, Outcome, Scene, Stage};

/// The top level: named scenes, persistent singletons, and the switch loop.
pub struct Game {
    scenes: HashMap<String, Box<dyn Scene>>,
    persistent: SharedSingletons,
    config: FrameConfig,
}

impl Game {
    /// Creates a game with the default frame configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Creates a game with the given frame configuration.
    #[must_use]
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            scenes: HashMap::new(),
            persistent: SharedSingletons::new(),
            config,
        }
    }

    /// Registers a scene under `name`.
    ///
    /// Registering a second scene under the same name replaces the first.
    pub fn register_scene(&mut self, name: impl Into<String>, scene: impl Scene + 'static) {
        self.scenes.insert(name.into(), Box::new(scene));
    }

    /// Creates a default-valued persistent singleton.
    ///
    /// Persistent singletons must be created before [`Game::start`]; every
    /// scene sees the same instances across switches.
    pub fn create_persistent_singleton<T: Default + 'static>(&mut self) {
        self.persistent.create::<T>();
    }

    /// Inserts a pre-built persistent singleton.
    pub fn insert_persistent_singleton<T: 'static>(&mut self, value: T) {
        self.persistent.insert(value);
    }

    /// Borrows a persistent singleton (application setup and teardown).
    #[must_use]
    pub fn persistent<T: 'static>(&self) -> Ref<'_, T> {
        self.persistent.get::<T>()
    }

    /// Mutably borrows a persistent singleton.
    #[must_use]
    pub fn persistent_mut<T: 'static>(&self) -> RefMut<'_, T> {
        self.persistent.get_mut::<T>()
    }

    /// Runs the game starting from the named scene.
    ///
    /// Each scene run gets a fresh stage; switch requests loop back here with
    /// the persistent tier re-attached, and a quit request (or an exhausted
    /// frame budget) returns.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownScene`] if `scene` (or a switch target)
    /// was never registered, and propagates scene and system errors.
    pub fn start(&mut self, scene: &str) -> Result<(), GameError> {
        let mut current = scene.to_string();
        loop {
            let handler = self
                .scenes
                .get_mut(&current)
                .ok_or_else(|| GameError::UnknownScene(current.clone()))?;

            info!(scene = %current, "starting scene");
            let mut stage = Stage::new(self.persistent.clone());
            stage.begin_init();
            handler.init(&mut stage)?;
            let outcome = stage.run(&self.config)?;
            handler.quit(&mut stage)?;

            match outcome {
                Outcome::Quit => break,
                Outcome::Switch(next) => {
                    info!(from = %current, to = %next, "switching scene");
                    current = next;
                }
            }
        }
        info!("game loop finished");
        Ok(())
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::FnSystem;

    struct QuitScene;
    impl Scene for QuitScene {
        fn init(&mut self, stage: &mut Stage) -> Result<(), GameError> {
            stage.register_system(FnSystem::new(|ctx| {
                ctx.quit();
                Ok(())
            }));
            Ok(())
        }
    }

    fn fast_game() -> Game {
        Game::with_config(FrameConfig {
            frame_rate: 10_000.0,
            max_frames: 0,
        })
    }

    #[test]
    fn test_start_runs_the_named_scene_to_quit() {
        let mut game = fast_game();
        game.register_scene("main", QuitScene);
        game.start("main").unwrap();
    }

    #[test]
    fn test_unknown_start_scene_is_an_error() {
        let mut game = fast_game();
        let err = game.start("missing").unwrap_err();
        assert!(matches!(err, GameError::UnknownScene(name) if name == "missing"));
    }

    #[test]
    fn test_unknown_switch_target_is_an_error() {
        struct SwitchScene;
        impl Scene for SwitchScene {
            fn init(&mut self, stage: &mut Stage) -> Result<(), GameError> {
                stage.register_system(FnSystem::new(|ctx| {
                    ctx.switch_scene("nowhere");
                    Ok(())
                }));
                Ok(())
            }
        }
        let mut game = fast_game();
        game.register_scene("main", SwitchScene);
        let err = game.start("main").unwrap_err();
        assert!(matches!(err, GameError::UnknownScene(name) if name == "nowhere"));
    }
}
