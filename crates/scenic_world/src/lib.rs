//! # scenic_world
//!
//! The per-scene runtime container. A [`World`] owns one scene's component
//! store, object identity and signatures, object-type definitions, the
//! incrementally-maintained query cache (groups and tags), the scene-scoped
//! singleton set, and the cooperative quit/switch event flags. A shared
//! handle to the persistent singleton tier is attached at construction and
//! survives scene switches.

pub mod error;
pub mod events;
pub mod query;
pub mod singleton;
pub mod world;

pub use error::WorldError;
pub use events::EventFlags;
pub use query::QueryCache;
pub use singleton::{SharedSingletons, SingletonSet};
pub use world::World;
