//! The per-frame update trait.

use crate::context::Context;
use crate::error::GameError;

/// A unit of per-frame game logic.
///
/// Systems are registered during scene init and run once per frame, in
/// registration order. Immediately after each system's update returns, the
/// driver applies the destructions that update queued — so an update may
/// iterate a query result and destroy its members without invalidating the
/// iteration in progress.
pub trait System {
    /// Advances this system by one frame.
    ///
    /// # Errors
    ///
    /// Errors propagate out of the frame loop and abort the run.
    fn update(&mut self, ctx: &mut Context<'_>) -> Result<(), GameError>;
}

/// Adapts a closure into a [`System`].
///
/// Convenient for small systems that carry no state of their own:
///
/// ```rust
/// use scenic_app::{FnSystem, Stage};
///
/// let mut stage = Stage::new(Default::default());
/// stage.begin_init();
/// stage.register_system(FnSystem::new(|ctx| {
///     if ctx.frame() > 100 {
///         ctx.quit();
///     }
///     Ok(())
/// }));
/// ```
pub struct FnSystem<F> {
    f: F,
}

impl<F> FnSystem<F>
where
    F: FnMut(&mut Context<'_>) -> Result<(), GameError>,
{
    /// Wraps a closure as a system.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> System for FnSystem<F>
where
    F: FnMut(&mut Context<'_>) -> Result<(), GameError>,
{
    fn update(&mut self, ctx: &mut Context<'_>) -> Result<(), GameError> {
        (self.f)(ctx)
    }
}
