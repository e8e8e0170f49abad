//! Error types for the generative fallback.

/// Errors from the generative backend.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("API key not configured (set {0})")]
    MissingApiKey(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("parse error: {0}")]
    ParseError(String),
    #[error("model returned no text")]
    EmptyReply,
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::ParseError(err.to_string())
    }
}
