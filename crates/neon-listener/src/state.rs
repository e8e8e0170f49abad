//! Listening phase machine with thread-safe transitions.
//!
//! Valid transitions:
//! - Idle -> AwaitingWake (assistant switched on)
//! - AwaitingWake -> Idle (assistant switched off between attempts)
//! - AwaitingWake -> CaptureCommand (wake word heard)
//! - CaptureCommand -> AwaitingWake (one command handled, whatever the outcome)

use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::error::ListenerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListeningPhase {
    /// Assistant switched off; the loop only polls the enable flag.
    Idle,
    /// Capturing short windows and checking them for the wake word.
    AwaitingWake,
    /// Capturing the one command that follows a wake word.
    CaptureCommand,
}

impl fmt::Display for ListeningPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListeningPhase::Idle => write!(f, "Idle"),
            ListeningPhase::AwaitingWake => write!(f, "AwaitingWake"),
            ListeningPhase::CaptureCommand => write!(f, "CaptureCommand"),
        }
    }
}

impl ListeningPhase {
    pub fn can_transition_to(&self, target: &ListeningPhase) -> bool {
        matches!(
            (self, target),
            (ListeningPhase::Idle, ListeningPhase::AwaitingWake)
                | (ListeningPhase::AwaitingWake, ListeningPhase::Idle)
                | (ListeningPhase::AwaitingWake, ListeningPhase::CaptureCommand)
                | (ListeningPhase::CaptureCommand, ListeningPhase::AwaitingWake)
        )
    }
}

#[derive(Debug)]
pub struct PhaseMachine {
    phase: Mutex<ListeningPhase>,
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self {
            phase: Mutex::new(ListeningPhase::Idle),
        }
    }

    pub fn current(&self) -> ListeningPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn transition(&self, target: ListeningPhase) -> Result<(), ListenerError> {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        if phase.can_transition_to(&target) {
            tracing::debug!("Listening phase: {} -> {}", *phase, target);
            *phase = target;
            Ok(())
        } else {
            Err(ListenerError::InvalidTransition {
                from: *phase,
                to: target,
            })
        }
    }

    /// Force the machine back to Idle after an error.
    pub fn reset(&self) {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        if *phase != ListeningPhase::Idle {
            tracing::warn!("Listening phase reset to Idle from {}", *phase);
            *phase = ListeningPhase::Idle;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
