//! Neon Listener crate - the wake-word listener loop.
//!
//! A single worker thread cycles through a strict phase machine:
//! Idle -> AwaitingWake -> CaptureCommand -> AwaitingWake. The enable flag,
//! wake word and current phase live in a shared [`SessionState`] that the
//! foreground surface toggles.

pub mod engine;
pub mod error;
pub mod session;
pub mod state;

pub use engine::{CycleOutcome, ListenerLoop, LoopSettings};
pub use error::ListenerError;
pub use session::SessionState;
pub use state::{ListeningPhase, PhaseMachine};
