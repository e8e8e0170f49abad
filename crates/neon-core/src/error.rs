use thiserror::Error;

/// Top-level error type for the Neon assistant.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for NeonError` so that `?` works across crate
/// boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NeonError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Audio error: {0}")]
    Audio(String),

    /// No usable microphone. Fatal to the listener loop.
    #[error("Input device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Recognition error: {0}")]
    Recognition(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Launch error: {0}")]
    Launch(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Shutdown in progress")]
    ShuttingDown,
}

impl NeonError {
    /// Whether the listener loop must stop rather than back off and retry.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            NeonError::DeviceUnavailable(_) | NeonError::Config(_) | NeonError::ShuttingDown
        )
    }
}

impl From<toml::de::Error> for NeonError {
    fn from(err: toml::de::Error) -> Self {
        NeonError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for NeonError {
    fn from(err: toml::ser::Error) -> Self {
        NeonError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for NeonError {
    fn from(err: serde_json::Error) -> Self {
        NeonError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Neon operations.
pub type Result<T> = std::result::Result<T, NeonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NeonError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let neon_err: NeonError = io_err.into();
        assert!(matches!(neon_err, NeonError::Io(_)));
        assert!(neon_err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_display_variants() {
        let cases: Vec<(NeonError, &str)> = vec![
            (
                NeonError::Storage("disk full".to_string()),
                "Storage error: disk full",
            ),
            (
                NeonError::DeviceUnavailable("no default input".to_string()),
                "Input device unavailable: no default input",
            ),
            (
                NeonError::Recognition("bad response".to_string()),
                "Recognition error: bad response",
            ),
            (
                NeonError::Launch("xdg-open missing".to_string()),
                "Launch error: xdg-open missing",
            ),
            (NeonError::ShuttingDown, "Shutdown in progress"),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_fatal_classification() {
        assert!(NeonError::DeviceUnavailable("gone".into()).is_fatal());
        assert!(NeonError::ShuttingDown.is_fatal());
        assert!(NeonError::Config("no api key".into()).is_fatal());
        assert!(!NeonError::Recognition("http 500".into()).is_fatal());
        assert!(!NeonError::Audio("stream error".into()).is_fatal());
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let neon_err: NeonError = err.unwrap_err().into();
        assert!(matches!(neon_err, NeonError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let neon_err: NeonError = err.unwrap_err().into();
        assert!(matches!(neon_err, NeonError::Serialization(_)));
    }
}
