//! Phrase segmentation over a stream of classified frames.
//!
//! Waits for speech to start within the capture timeout, then collects the
//! phrase until a pause or the phrase limit ends it. A short run of frames
//! before the onset is kept so the first syllable is not clipped.

use std::collections::VecDeque;
use std::time::Duration;

use neon_core::speech::CaptureWindow;

use crate::VadResult;

/// Frames of audio kept from before speech onset.
const PRE_ROLL: Duration = Duration::from_millis(500);
/// Bursts shorter than this are treated as clicks and discarded.
const MIN_SPEECH: Duration = Duration::from_millis(300);
/// Slack for accumulated frame durations.
const EPSILON: f32 = 1e-3;

fn reached(elapsed: f32, bound: f32) -> bool {
    elapsed + EPSILON >= bound
}

/// What the caller should do after pushing a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentEvent {
    Continue,
    /// No speech began before the timeout.
    Timeout,
    /// A phrase is ready in [`PhraseSegmenter::take_phrase`].
    Complete,
}

#[derive(Debug)]
enum Phase {
    Waiting { waited: f32 },
    /// `waited` is the wait before onset, carried back if the burst is
    /// discarded so the start timeout keeps counting.
    Phrase {
        waited: f32,
        length: f32,
        speech: f32,
        silence: f32,
    },
}

#[derive(Debug)]
pub struct PhraseSegmenter {
    frame_secs: f32,
    timeout: f32,
    phrase_limit: f32,
    pause: f32,
    pre_roll_frames: usize,
    pre_roll: VecDeque<Vec<f32>>,
    phrase: Vec<f32>,
    phase: Phase,
}

impl PhraseSegmenter {
    /// `frame` is the duration of each pushed frame. A zero timeout or
    /// phrase limit means unbounded.
    pub fn new(window: CaptureWindow, pause: Duration, frame: Duration) -> Self {
        let frame_secs = frame.as_secs_f32().max(f32::EPSILON);
        Self {
            frame_secs,
            timeout: window.timeout.as_secs_f32(),
            phrase_limit: window.phrase_limit.as_secs_f32(),
            pause: pause.as_secs_f32(),
            pre_roll_frames: (PRE_ROLL.as_secs_f32() / frame_secs).ceil() as usize,
            pre_roll: VecDeque::new(),
            phrase: Vec::new(),
            phase: Phase::Waiting { waited: 0.0 },
        }
    }

    /// True until speech has started.
    pub fn is_waiting(&self) -> bool {
        matches!(self.phase, Phase::Waiting { .. })
    }

    pub fn push(&mut self, frame: &[f32], vad: VadResult) -> SegmentEvent {
        let is_speech = vad == VadResult::Speech;
        match &mut self.phase {
            Phase::Waiting { waited } => {
                if is_speech {
                    let waited = *waited;
                    self.phrase = self.pre_roll.drain(..).flatten().collect();
                    self.phrase.extend_from_slice(frame);
                    self.phase = Phase::Phrase {
                        waited,
                        length: self.frame_secs,
                        speech: self.frame_secs,
                        silence: 0.0,
                    };
                    return SegmentEvent::Continue;
                }
                *waited += self.frame_secs;
                if self.timeout > 0.0 && reached(*waited, self.timeout) {
                    return SegmentEvent::Timeout;
                }
                self.pre_roll.push_back(frame.to_vec());
                while self.pre_roll.len() > self.pre_roll_frames {
                    self.pre_roll.pop_front();
                }
                SegmentEvent::Continue
            }
            Phase::Phrase {
                waited,
                length,
                speech,
                silence,
            } => {
                self.phrase.extend_from_slice(frame);
                *length += self.frame_secs;
                if is_speech {
                    *speech += self.frame_secs;
                    *silence = 0.0;
                } else {
                    *silence += self.frame_secs;
                }

                let paused = reached(*silence, self.pause);
                let limited = self.phrase_limit > 0.0 && reached(*length, self.phrase_limit);
                if !paused && !limited {
                    return SegmentEvent::Continue;
                }
                if *speech < MIN_SPEECH.as_secs_f32() && !limited {
                    // Too short to be a word; go back to waiting.
                    let waited = *waited + *length;
                    self.phrase.clear();
                    self.phase = Phase::Waiting { waited };
                    if self.timeout > 0.0 && reached(waited, self.timeout) {
                        return SegmentEvent::Timeout;
                    }
                    return SegmentEvent::Continue;
                }
                SegmentEvent::Complete
            }
        }
    }

    /// Samples of the completed phrase, including pre-roll.
    pub fn take_phrase(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.phrase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(100);

    fn segmenter(timeout: f32, limit: f32) -> PhraseSegmenter {
        PhraseSegmenter::new(
            CaptureWindow::from_secs(timeout, limit),
            Duration::from_millis(800),
            FRAME,
        )
    }

    fn feed(seg: &mut PhraseSegmenter, pattern: &[VadResult]) -> Vec<SegmentEvent> {
        pattern.iter().map(|v| seg.push(&[0.0; 4], *v)).collect()
    }

    use VadResult::{Silence as S, Speech as V};

    #[test]
    fn test_timeout_without_speech() {
        let mut seg = segmenter(2.0, 4.0);
        let events = feed(&mut seg, &[S; 20]);
        assert_eq!(events[18], SegmentEvent::Continue);
        assert_eq!(events[19], SegmentEvent::Timeout);
    }

    #[test]
    fn test_phrase_ends_on_pause() {
        let mut seg = segmenter(2.0, 4.0);
        let mut pattern = vec![S, S, V, V, V, V, V];
        pattern.extend([S; 8]);
        let events = feed(&mut seg, &pattern);
        assert_eq!(*events.last().unwrap(), SegmentEvent::Complete);
        assert!(events[..events.len() - 1]
            .iter()
            .all(|e| *e == SegmentEvent::Continue));
        // 2 pre-roll frames + 5 speech + 8 silence, 4 samples each
        assert_eq!(seg.take_phrase().len(), 15 * 4);
    }

    #[test]
    fn test_phrase_limit_cuts_long_speech() {
        let mut seg = segmenter(2.0, 1.0);
        let events = feed(&mut seg, &[V; 10]);
        assert_eq!(events[8], SegmentEvent::Continue);
        assert_eq!(events[9], SegmentEvent::Complete);
    }

    #[test]
    fn test_click_is_discarded() {
        let mut seg = segmenter(5.0, 4.0);
        let mut pattern = vec![V];
        pattern.extend([S; 8]);
        let events = feed(&mut seg, &pattern);
        assert!(events.iter().all(|e| *e == SegmentEvent::Continue));
        assert!(seg.is_waiting());
        assert!(seg.take_phrase().is_empty());
    }

    #[test]
    fn test_periodic_clicks_do_not_extend_timeout() {
        let mut seg = PhraseSegmenter::new(
            CaptureWindow::from_secs(2.0, 4.0),
            Duration::from_millis(800),
            Duration::from_millis(50),
        );
        let mut period = vec![S; 20];
        period.extend([V, V]);
        let pattern: Vec<VadResult> = period.iter().copied().cycle().take(600).collect();
        let events = feed(&mut seg, &pattern);
        let first_timeout = events.iter().position(|e| *e == SegmentEvent::Timeout);
        // 2 s of 50 ms frames, clicks included
        assert_eq!(first_timeout, Some(39));
    }

    #[test]
    fn test_speech_after_timeout_window_started() {
        let mut seg = segmenter(2.0, 4.0);
        let events = feed(&mut seg, &[S, S, S, V, V, V, V]);
        assert!(events.iter().all(|e| *e == SegmentEvent::Continue));
        assert!(!seg.is_waiting());
    }

    #[test]
    fn test_zero_timeout_waits_forever() {
        let mut seg = segmenter(0.0, 4.0);
        let events = feed(&mut seg, &[S; 100]);
        assert!(events.iter().all(|e| *e == SegmentEvent::Continue));
    }
}
