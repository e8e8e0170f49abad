//! Energy-threshold voice activity gate.
//!
//! Energy is the RMS of a frame on the 16-bit sample scale, so a threshold
//! of 400 means roughly -38 dBFS. Calibration blends the threshold toward a
//! multiple of the measured ambient energy.

use crate::{VadResult, VoiceActivityDetector};

/// Multiple of ambient energy the threshold is pulled toward.
const DYNAMIC_RATIO: f32 = 1.5;
/// Fraction of the old threshold kept per second of calibration audio.
const DYNAMIC_DAMPING: f32 = 0.15;

#[derive(Debug, Clone)]
pub struct EnergyGate {
    threshold: f32,
    dynamic: bool,
}

impl EnergyGate {
    pub fn new(threshold: f32, dynamic: bool) -> Self {
        Self {
            threshold: threshold.max(0.0),
            dynamic,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Whether the threshold keeps adapting during silence.
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// RMS energy of a frame on the 16-bit scale.
    pub fn energy(frame: &[f32]) -> f32 {
        if frame.is_empty() {
            return 0.0;
        }
        let sum: f32 = frame.iter().map(|s| s * s).sum();
        (sum / frame.len() as f32).sqrt() * 32768.0
    }

    /// Pull the threshold toward the energy of one frame of background
    /// noise lasting `frame_secs`.
    pub fn adapt(&mut self, frame: &[f32], frame_secs: f32) {
        let damping = DYNAMIC_DAMPING.powf(frame_secs);
        let target = Self::energy(frame) * DYNAMIC_RATIO;
        self.threshold = self.threshold * damping + target * (1.0 - damping);
    }

    /// Calibrate against a run of ambient frames.
    pub fn calibrate<'a>(&mut self, frames: impl IntoIterator<Item = &'a [f32]>, frame_secs: f32) {
        for frame in frames {
            self.adapt(frame, frame_secs);
        }
        tracing::debug!(threshold = self.threshold, "Energy threshold calibrated");
    }
}

impl VoiceActivityDetector for EnergyGate {
    fn detect(&self, audio_frame: &[f32]) -> VadResult {
        if audio_frame.is_empty() {
            return VadResult::Unknown;
        }
        if Self::energy(audio_frame) > self.threshold {
            VadResult::Speech
        } else {
            VadResult::Silence
        }
    }
}
