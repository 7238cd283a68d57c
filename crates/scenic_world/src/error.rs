//! World error types.
//!
//! Only deliberate runtime failure modes appear here. Contract violations —
//! component access outside an object's signature, singleton access before
//! creation, registration after objects exist — panic instead: they signal
//! registration-order or signature-design bugs, not runtime conditions.

use thiserror::Error;

/// Errors from world operations.
#[derive(Debug, Error)]
pub enum WorldError {
    /// `create_object` was called with a name no definition was recorded for.
    #[error("unknown object definition '{0}'")]
    UnknownDefinition(String),
}
