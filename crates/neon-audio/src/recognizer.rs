//! Microphone-backed [`SpeechRecognizer`].

use std::time::Duration;

use neon_core::config::RecognizerConfig;
use neon_core::error::Result;
use neon_core::speech::{CaptureWindow, Recognition, SpeechRecognizer};

use crate::google_speech::GoogleSpeechClient;
use crate::microphone::{LiveInput, Microphone};
use crate::segmenter::{PhraseSegmenter, SegmentEvent};
use crate::vad::EnergyGate;
use crate::{VadResult, VoiceActivityDetector};

/// Length of each frame fed to the gate.
const FRAME: Duration = Duration::from_millis(50);

/// Anything that can hand out fixed-length sample frames.
pub trait FrameSource {
    fn next_frame(&mut self, len: usize) -> Result<Vec<f32>>;
}

impl FrameSource for LiveInput {
    fn next_frame(&mut self, len: usize) -> Result<Vec<f32>> {
        LiveInput::next_frame(self, len)
    }
}

/// Captures phrases from the default microphone and transcribes them with
/// Google Speech-to-Text.
///
/// Holds a cpal device handle, so it is built on the thread that uses it.
pub struct MicrophoneRecognizer {
    microphone: Microphone,
    client: GoogleSpeechClient,
    gate: EnergyGate,
    pause: Duration,
    calibration: Duration,
}

impl MicrophoneRecognizer {
    /// Open the default input device and read the API key from the
    /// environment.
    pub fn open(config: &RecognizerConfig) -> Result<Self> {
        let microphone = Microphone::open(config.sample_rate)?;
        let client = GoogleSpeechClient::from_env(config);
        Ok(Self::with_parts(microphone, client, config))
    }

    pub fn with_parts(
        microphone: Microphone,
        client: GoogleSpeechClient,
        config: &RecognizerConfig,
    ) -> Self {
        Self {
            microphone,
            client,
            gate: EnergyGate::new(config.energy_threshold, config.dynamic_energy),
            pause: Duration::from_secs_f32(config.pause_threshold_secs.max(0.0)),
            calibration: Duration::from_secs_f32(config.calibration_secs.max(0.0)),
        }
    }

    fn frame_len(&self) -> usize {
        (FRAME.as_secs_f32() * self.microphone.sample_rate() as f32) as usize
    }
}

impl SpeechRecognizer for MicrophoneRecognizer {
    fn calibrate(&mut self) -> Result<()> {
        self.client.ensure_api_key()?;
        if self.calibration.is_zero() {
            return Ok(());
        }
        let ambient = self.microphone.record(self.calibration)?;
        let frame_len = self.frame_len().max(1);
        self.gate
            .calibrate(ambient.chunks(frame_len), FRAME.as_secs_f32());
        tracing::info!(threshold = self.gate.threshold(), "Adjusted for ambient noise");
        Ok(())
    }

    fn listen(&mut self, window: CaptureWindow) -> Result<Recognition> {
        let frame_len = self.frame_len().max(1);
        let segmenter = PhraseSegmenter::new(window, self.pause, FRAME);
        let phrase = {
            let mut input = self.microphone.start()?;
            capture_phrase(&mut input, &mut self.gate, segmenter, frame_len)?
        };

        let Some(samples) = phrase else {
            return Ok(Recognition::Timeout);
        };
        let transcript = self
            .client
            .transcribe(&samples, self.microphone.sample_rate())?;
        Ok(to_recognition(transcript))
    }
}

/// Pull frames until the segmenter finishes. `None` means nobody spoke
/// before the timeout.
pub(crate) fn capture_phrase<S: FrameSource>(
    source: &mut S,
    gate: &mut EnergyGate,
    mut segmenter: PhraseSegmenter,
    frame_len: usize,
) -> Result<Option<Vec<f32>>> {
    let frame_secs = FRAME.as_secs_f32();
    loop {
        let frame = source.next_frame(frame_len)?;
        let vad = gate.detect(&frame);
        if gate.is_dynamic() && segmenter.is_waiting() && vad != VadResult::Speech {
            gate.adapt(&frame, frame_secs);
        }
        match segmenter.push(&frame, vad) {
            SegmentEvent::Continue => {}
            SegmentEvent::Timeout => return Ok(None),
            SegmentEvent::Complete => return Ok(Some(segmenter.take_phrase())),
        }
    }
}

fn to_recognition(transcript: Option<String>) -> Recognition {
    match transcript.map(|t| t.trim().to_lowercase()) {
        Some(text) if !text.is_empty() => Recognition::Heard(text),
        _ => Recognition::Unintelligible,
    }
}
