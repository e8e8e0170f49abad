use tracing::warn;

use crate::error::ChatError;
use crate::sanitize::sanitize_for_speech;

pub const MISSING_KEY_REPLY: &str = "I cannot find my API key.";
pub const UNAVAILABLE_REPLY: &str = "I'm having trouble connecting to the server.";

/// Produces free-form replies for commands no other handler claimed.
pub trait ReplyGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, ChatError>;
}

impl<T: ReplyGenerator + ?Sized> ReplyGenerator for std::sync::Arc<T> {
    fn generate(&self, prompt: &str) -> Result<String, ChatError> {
        (**self).generate(prompt)
    }
}

/// What the assistant says after a fallback attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReply {
    /// Sanitized model reply.
    Answer(String),
    MissingKey,
    Unavailable,
}

impl FallbackReply {
    pub fn spoken_text(&self) -> &str {
        match self {
            FallbackReply::Answer(text) => text,
            FallbackReply::MissingKey => MISSING_KEY_REPLY,
            FallbackReply::Unavailable => UNAVAILABLE_REPLY,
        }
    }

    /// Backend failures are shown as inactive status.
    pub fn is_failure(&self) -> bool {
        matches!(self, FallbackReply::Unavailable)
    }
}

/// Ask the generator and fold every failure into a speakable reply.
pub fn resolve_fallback(generator: &dyn ReplyGenerator, prompt: &str) -> FallbackReply {
    match generator.generate(prompt) {
        Ok(text) => {
            let clean = sanitize_for_speech(&text);
            if clean.is_empty() {
                warn!("Generative reply was empty after sanitizing");
                FallbackReply::Unavailable
            } else {
                FallbackReply::Answer(clean)
            }
        }
        Err(ChatError::MissingApiKey(var)) => {
            warn!(env = %var, "Generative fallback has no API key");
            FallbackReply::MissingKey
        }
        Err(e) => {
            warn!(error = %e, "Generative fallback failed");
            FallbackReply::Unavailable
        }
    }
}
