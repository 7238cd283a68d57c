//! Cooperative end-of-frame signals.
//!
//! Systems and interfaces raise these flags during an update; the scene
//! driver checks them after all systems have run. Neither flag preempts
//! anything mid-frame.

/// Quit and switch-scene requests for the current scene run.
#[derive(Debug, Clone, Default)]
pub struct EventFlags {
    quit: bool,
    switch_to: Option<String>,
}

impl EventFlags {
    /// Requests that the frame loop end and the game shut down.
    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    /// Requests a switch to the named scene at the end of this frame.
    pub fn request_switch(&mut self, scene: impl Into<String>) {
        self.switch_to = Some(scene.into());
    }

    /// Returns `true` if a quit was requested this run.
    #[must_use]
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Returns the switch target, if a switch was requested this run.
    #[must_use]
    pub fn switch_requested(&self) -> Option<&str> {
        self.switch_to.as_deref()
    }

    /// Clears both flags.
    pub fn reset(&mut self) {
        self.quit = false;
        self.switch_to = None;
    }
}
