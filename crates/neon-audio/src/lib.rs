//! Neon Audio crate - microphone capture, energy VAD, speech recognition,
//! and speech synthesis.
//!
//! [`MicrophoneRecognizer`] implements the core `SpeechRecognizer` seam on
//! top of a cpal input stream, an energy-threshold gate, and the Google
//! Cloud Speech REST API. [`SystemSpeaker`] implements `Speaker` with the
//! platform's built-in text-to-speech command.

pub mod google_speech;
pub mod microphone;
pub mod recognizer;
pub mod segmenter;
pub mod synth;
pub mod vad;

pub use google_speech::GoogleSpeechClient;
pub use microphone::{LiveInput, Microphone};
pub use recognizer::{FrameSource, MicrophoneRecognizer};
pub use segmenter::{PhraseSegmenter, SegmentEvent};
pub use synth::{SystemSpeaker, TtsEngine};
pub use vad::EnergyGate;

/// Result of voice activity detection on an audio frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadResult {
    /// Speech was detected in the audio frame.
    Speech,
    /// The audio frame contains only silence or background noise.
    Silence,
    /// The detector could not decide (e.g., empty frame).
    Unknown,
}

/// Voice activity detector for audio frames.
pub trait VoiceActivityDetector: Send + Sync {
    /// Classify a frame of PCM samples in [-1.0, 1.0].
    fn detect(&self, audio_frame: &[f32]) -> VadResult;
}

/// Convert f32 samples in [-1.0, 1.0] to 16-bit little-endian PCM.
pub fn samples_to_pcm16(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        #[allow(clippy::cast_possible_truncation)]
        let value = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm16_conversion() {
        let bytes = samples_to_pcm16(&[0.0, 1.0, -1.0, 2.0]);
        assert_eq!(bytes.len(), 8);
        assert_eq!(i16::from_le_bytes([bytes[0], bytes[1]]), 0);
        assert_eq!(i16::from_le_bytes([bytes[2], bytes[3]]), 32767);
        assert_eq!(i16::from_le_bytes([bytes[4], bytes[5]]), -32767);
        // Out-of-range input is clamped
        assert_eq!(i16::from_le_bytes([bytes[6], bytes[7]]), 32767);
    }

    #[test]
    fn test_vad_result_equality() {
        assert_eq!(VadResult::Speech, VadResult::Speech);
        assert_ne!(VadResult::Speech, VadResult::Silence);
        assert_ne!(VadResult::Silence, VadResult::Unknown);
    }
}
