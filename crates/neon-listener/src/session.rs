//! Shared session state between the listener worker and the surface.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use neon_core::config::DEFAULT_WAKE_WORD;
use neon_core::error::NeonError;
use neon_core::status::StatusReporter;

use crate::error::ListenerError;
use crate::state::{ListeningPhase, PhaseMachine};

/// Enable flag, wake word and listening phase for one signed-in session.
///
/// Lives for the whole process and is shared through `Arc`. The surface
/// flips the flags; only the listener loop moves the phase.
pub struct SessionState {
    enabled: AtomicBool,
    shutdown: AtomicBool,
    wake_word: Mutex<String>,
    phase: PhaseMachine,
    reporter: Arc<dyn StatusReporter>,
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("enabled", &self.is_enabled())
            .field("shutdown", &self.is_shutdown())
            .field("wake_word", &self.wake_word())
            .field("phase", &self.phase())
            .finish()
    }
}

impl SessionState {
    /// Start disabled with the given wake word, or the default if it is
    /// blank.
    pub fn new(wake_word: &str, reporter: Arc<dyn StatusReporter>) -> Self {
        let wake_word = normalize(wake_word).unwrap_or_else(|| DEFAULT_WAKE_WORD.to_string());
        Self {
            enabled: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
            wake_word: Mutex::new(wake_word),
            phase: PhaseMachine::new(),
            reporter,
        }
    }

    pub fn reporter(&self) -> &Arc<dyn StatusReporter> {
        &self.reporter
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Switch the assistant on or off and report the new state.
    ///
    /// Takes effect between capture attempts; a capture already in flight
    /// is allowed to finish.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        if enabled {
            self.reporter
                .report(&format!("Listening for '{}'...", self.wake_word()), true);
        } else {
            self.reporter.report("Idle - Assistant Off", false);
        }
        tracing::info!(enabled, "Assistant toggled");
    }

    /// Flip the enable flag, returning the new value.
    pub fn toggle(&self) -> bool {
        let enabled = !self.is_enabled();
        self.set_enabled(enabled);
        enabled
    }

    pub fn wake_word(&self) -> String {
        self.wake_word
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the wake word. Stored lowercased with whitespace collapsed.
    pub fn set_wake_word(&self, word: &str) -> Result<String, ListenerError> {
        let word = normalize(word)
            .ok_or_else(|| NeonError::InvalidInput("wake word cannot be empty".into()))?;
        *self.wake_word.lock().unwrap_or_else(PoisonError::into_inner) = word.clone();
        tracing::info!(wake_word = %word, "Wake word updated");
        if self.is_enabled() {
            self.reporter
                .report(&format!("Listening for '{word}'..."), true);
        }
        Ok(word)
    }

    /// Whether a lowercased transcript contains the wake word.
    pub fn matches_wake(&self, transcript: &str) -> bool {
        transcript.to_lowercase().contains(&self.wake_word())
    }

    /// Reset the status surface to plain "Idle".
    pub fn clear_status(&self) {
        self.reporter.report("Idle", false);
    }

    pub fn phase(&self) -> ListeningPhase {
        self.phase.current()
    }

    pub(crate) fn phases(&self) -> &PhaseMachine {
        &self.phase
    }

    /// Ask the listener loop to exit after its current attempt.
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

fn normalize(word: &str) -> Option<String> {
    let word = word.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    (!word.is_empty()).then_some(word)
}
