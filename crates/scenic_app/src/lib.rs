//! # scenic_app
//!
//! The execution layer of the scenic runtime.
//!
//! - [`Context`] — the capability-scoped façade handed to systems and
//!   interfaces for the duration of one update.
//! - [`System`] / [`FnSystem`] — per-frame update logic.
//! - [`Interface`] — user-defined capability extensions shared by systems.
//! - [`Scene`] / [`Stage`] — scene lifecycle and the frame loop driver,
//!   including deferred-destroy flushing and named system batches.
//! - [`Game`] — the top level: named scenes, persistent singletons, and the
//!   scene-switch handoff loop.

pub mod context;
pub mod error;
pub mod game;
pub mod interface;
pub mod scene;
pub mod system;

pub use context::{Context, DestroyQueue};
pub use error::GameError;
pub use game::Game;
pub use interface::{Interface, InterfaceSet};
pub use scene::{FrameConfig, Outcome, Scene, SceneState, Stage};
pub use system::{FnSystem, System};
