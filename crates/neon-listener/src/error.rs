use neon_core::error::NeonError;
use thiserror::Error;

use crate::state::ListeningPhase;

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: ListeningPhase,
        to: ListeningPhase,
    },

    #[error(transparent)]
    Core(#[from] NeonError),
}

impl ListenerError {
    /// Whether the loop must stop instead of backing off.
    pub fn is_fatal(&self) -> bool {
        match self {
            ListenerError::InvalidTransition { .. } => false,
            ListenerError::Core(e) => e.is_fatal(),
        }
    }
}

impl From<ListenerError> for NeonError {
    fn from(err: ListenerError) -> Self {
        match err {
            ListenerError::Core(e) => e,
            other => NeonError::InvalidInput(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_error_message() {
        let err = ListenerError::InvalidTransition {
            from: ListeningPhase::Idle,
            to: ListeningPhase::CaptureCommand,
        };
        assert_eq!(
            err.to_string(),
            "Invalid state transition: Idle -> CaptureCommand"
        );
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_core_fatality_passes_through() {
        let err: ListenerError = NeonError::DeviceUnavailable("unplugged".into()).into();
        assert!(err.is_fatal());
        let err: ListenerError = NeonError::Recognition("HTTP 503".into()).into();
        assert!(!err.is_fatal());
        assert!(matches!(NeonError::from(err), NeonError::Recognition(_)));
    }
}
