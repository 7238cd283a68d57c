//! Execution-layer error types.

use thiserror::Error;

use scenic_world::WorldError;

/// Errors surfaced by scene setup, system updates, and the game loop.
#[derive(Debug, Error)]
pub enum GameError {
    /// A world operation failed.
    #[error(transparent)]
    World(#[from] WorldError),

    /// `start` or a switch request named a scene that was never registered.
    #[error("unknown scene '{0}'")]
    UnknownScene(String),
}
