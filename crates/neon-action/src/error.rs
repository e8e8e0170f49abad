//! Error types for command execution.

use neon_core::error::NeonError;

use crate::types::Tier;

/// Errors from action handler execution.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Action handler failed: {0}")]
    HandlerFailed(String),
    #[error("No handler registered for tier: {0}")]
    UnregisteredHandler(Tier),
    #[error("Handler for {expected} received a {actual} match")]
    MismatchedCommand { expected: Tier, actual: Tier },
    #[error("Launch failed: {0}")]
    Launch(String),
    #[error(transparent)]
    Core(#[from] NeonError),
}
