//! Generative conversational fallback for Neon.
//!
//! Commands that no other handler claims are sent to a hosted language
//! model with a voice-assistant persona. Replies are sanitized for speech,
//! and every failure collapses into a fixed spoken apology.

pub mod error;
pub mod fallback;
pub mod gemini;
pub mod sanitize;

pub use error::ChatError;
pub use fallback::{resolve_fallback, FallbackReply, ReplyGenerator};
pub use gemini::GeminiClient;
pub use sanitize::sanitize_for_speech;
