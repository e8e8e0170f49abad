//! Speech input and output seams.
//!
//! The listener loop and action handlers talk to audio hardware only through
//! these traits, so they can be driven by scripted fakes in tests.

use std::time::Duration;

use crate::error::Result;

/// Bounds for a single capture attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureWindow {
    /// How long to wait for speech to begin.
    pub timeout: Duration,
    /// Maximum phrase length once speech has begun.
    pub phrase_limit: Duration,
}

impl CaptureWindow {
    pub fn new(timeout: Duration, phrase_limit: Duration) -> Self {
        Self {
            timeout,
            phrase_limit,
        }
    }

    pub fn from_secs(timeout: f32, phrase_limit: f32) -> Self {
        Self::new(
            Duration::from_secs_f32(timeout.max(0.0)),
            Duration::from_secs_f32(phrase_limit.max(0.0)),
        )
    }
}

/// Outcome of one capture attempt.
///
/// Timeouts and unintelligible audio are ordinary outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognition {
    /// Lowercased transcript.
    Heard(String),
    /// No speech started within the window.
    Timeout,
    /// Speech was captured but could not be transcribed.
    Unintelligible,
}

impl Recognition {
    pub fn text(&self) -> Option<&str> {
        match self {
            Recognition::Heard(text) => Some(text),
            _ => None,
        }
    }
}

/// Converts captured audio into text.
pub trait SpeechRecognizer {
    /// Calibrate against ambient noise. Called once before the first listen.
    fn calibrate(&mut self) -> Result<()>;

    /// Block until a phrase is captured or the window elapses.
    fn listen(&mut self, window: CaptureWindow) -> Result<Recognition>;
}

/// Speaks text aloud, blocking until playback and settle time are over.
///
/// Implementations log and swallow engine failures.
pub trait Speaker: Send + Sync {
    fn speak(&self, text: &str);
}

impl<T: Speaker + ?Sized> Speaker for std::sync::Arc<T> {
    fn speak(&self, text: &str) {
        (**self).speak(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_window_from_secs() {
        let window = CaptureWindow::from_secs(2.0, 4.0);
        assert_eq!(window.timeout, Duration::from_secs(2));
        assert_eq!(window.phrase_limit, Duration::from_secs(4));
    }

    #[test]
    fn test_capture_window_clamps_negative() {
        let window = CaptureWindow::from_secs(-1.0, 3.0);
        assert_eq!(window.timeout, Duration::ZERO);
    }

    #[test]
    fn test_recognition_text() {
        assert_eq!(Recognition::Heard("hey alexa".into()).text(), Some("hey alexa"));
        assert_eq!(Recognition::Timeout.text(), None);
        assert_eq!(Recognition::Unintelligible.text(), None);
    }
}
