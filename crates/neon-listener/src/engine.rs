//! The listener loop.
//!
//! Runs on one dedicated worker thread. Every capture, transcription,
//! synthesis and command is blocking and strictly sequential, so at most
//! one command window follows each wake word.

use std::sync::Arc;
use std::time::Duration;

use neon_action::{ActionResult, CommandProcessor};
use neon_core::config::AssistantConfig;
use neon_core::error::NeonError;
use neon_core::speech::{CaptureWindow, Recognition, Speaker, SpeechRecognizer};

use crate::error::ListenerError;
use crate::session::SessionState;
use crate::state::ListeningPhase;

/// Timing and phrasing for the loop.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub poll_interval: Duration,
    pub error_backoff: Duration,
    pub wake_window: CaptureWindow,
    pub command_window: CaptureWindow,
    pub wake_ack: String,
    pub command_ack: String,
}

impl LoopSettings {
    pub fn from_config(config: &AssistantConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            error_backoff: config.error_backoff(),
            wake_window: config.wake_window(),
            command_window: config.command_window(),
            wake_ack: config.wake_ack.clone(),
            command_ack: config.command_ack.clone(),
        }
    }
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self::from_config(&AssistantConfig::default())
    }
}

/// What one pass through the loop did.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Assistant switched off; slept one poll interval.
    Disabled,
    /// Nothing captured, or the capture did not contain the wake word.
    NoWake,
    /// Wake word heard but no command started in time.
    CommandTimeout,
    /// Wake word heard but the command could not be transcribed.
    CommandUnintelligible,
    /// A command was dispatched.
    Handled(ActionResult),
    /// Shutdown was requested.
    Shutdown,
}

pub struct ListenerLoop<R: SpeechRecognizer> {
    recognizer: R,
    session: Arc<SessionState>,
    speaker: Arc<dyn Speaker>,
    processor: Arc<dyn CommandProcessor>,
    settings: LoopSettings,
}

impl<R: SpeechRecognizer> ListenerLoop<R> {
    pub fn new(
        recognizer: R,
        session: Arc<SessionState>,
        speaker: Arc<dyn Speaker>,
        processor: Arc<dyn CommandProcessor>,
        settings: LoopSettings,
    ) -> Self {
        Self {
            recognizer,
            session,
            speaker,
            processor,
            settings,
        }
    }

    /// Calibrate, then cycle until shutdown or a fatal error.
    ///
    /// Recoverable errors are logged and followed by the error backoff. A
    /// fatal error is reported on the status surface and returned; the
    /// surface itself keeps working.
    pub fn run(&mut self) -> Result<(), ListenerError> {
        tracing::info!("Listener loop starting");
        if let Err(e) = self.recognizer.calibrate() {
            return Err(self.halt(e.into()));
        }

        loop {
            match self.run_cycle() {
                Ok(CycleOutcome::Shutdown) => break,
                Ok(outcome) => tracing::trace!(?outcome, "Cycle finished"),
                Err(e) if e.is_fatal() => return Err(self.halt(e)),
                Err(e) => {
                    tracing::warn!(error = %e, "Listener cycle failed, backing off");
                    self.session.phases().reset();
                    std::thread::sleep(self.settings.error_backoff);
                }
            }
        }

        self.session.phases().reset();
        tracing::info!("Listener loop stopped");
        Ok(())
    }

    /// One pass: poll the flag, or listen once for the wake word and, if it
    /// is heard, capture and handle one command.
    pub fn run_cycle(&mut self) -> Result<CycleOutcome, ListenerError> {
        if self.session.is_shutdown() {
            return Ok(CycleOutcome::Shutdown);
        }

        let session = Arc::clone(&self.session);
        let phases = session.phases();
        if !self.session.is_enabled() {
            if phases.current() == ListeningPhase::AwaitingWake {
                phases.transition(ListeningPhase::Idle)?;
            }
            std::thread::sleep(self.settings.poll_interval);
            return Ok(CycleOutcome::Disabled);
        }
        if phases.current() == ListeningPhase::Idle {
            phases.transition(ListeningPhase::AwaitingWake)?;
        }

        match self.recognizer.listen(self.settings.wake_window)? {
            Recognition::Heard(text) if session.matches_wake(&text) => {
                tracing::info!(transcript = %text, "Wake word detected");
            }
            Recognition::Heard(text) => {
                tracing::debug!(transcript = %text, "No wake word");
                return Ok(CycleOutcome::NoWake);
            }
            Recognition::Timeout | Recognition::Unintelligible => {
                return Ok(CycleOutcome::NoWake);
            }
        }

        phases.transition(ListeningPhase::CaptureCommand)?;
        let outcome = self.capture_command();
        phases.transition(ListeningPhase::AwaitingWake)?;
        session.reporter().report("Idle - Assistant On", false);
        outcome
    }

    fn capture_command(&mut self) -> Result<CycleOutcome, ListenerError> {
        let reporter = self.session.reporter();
        reporter.report("Listening for command...", true);
        self.speaker.speak(&self.settings.wake_ack);

        match self.recognizer.listen(self.settings.command_window)? {
            Recognition::Heard(command) => {
                tracing::info!(command = %command, "Command heard");
                self.speaker.speak(&self.settings.command_ack);
                let result = self.processor.process(&command);
                tracing::info!(
                    tier = %result.tier,
                    success = result.success,
                    message = %result.message,
                    "Command handled"
                );
                Ok(CycleOutcome::Handled(result))
            }
            Recognition::Timeout => {
                reporter.report("Timed out. Idle.", false);
                self.speaker.speak("I didn't hear anything.");
                Ok(CycleOutcome::CommandTimeout)
            }
            Recognition::Unintelligible => {
                reporter.report("Didn't understand. Idle.", false);
                self.speaker.speak("I couldn't understand that.");
                Ok(CycleOutcome::CommandUnintelligible)
            }
        }
    }

    fn halt(&self, err: ListenerError) -> ListenerError {
        tracing::error!(error = %err, "Listener loop halted");
        let status = match &err {
            ListenerError::Core(NeonError::DeviceUnavailable(_)) => {
                "Microphone unavailable. Assistant stopped.".to_string()
            }
            other => format!("Assistant stopped: {other}"),
        };
        self.session.reporter().report(&status, false);
        self.session.phases().reset();
        err
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use neon_action::Tier;
    use neon_core::error::Result;
    use neon_core::status::{StatusMessage, StatusReporter};

    use super::*;

    // -------------------------------------------------------------------------
    // Fakes
    // -------------------------------------------------------------------------

    #[derive(Default)]
    struct ScriptedRecognizer {
        script: VecDeque<Result<Recognition>>,
        windows: Vec<CaptureWindow>,
        calibration: Option<NeonError>,
        /// Switches the assistant off from inside every `listen` call.
        disable_during: Option<Arc<SessionState>>,
    }

    impl ScriptedRecognizer {
        fn new(script: Vec<Result<Recognition>>) -> Self {
            Self {
                script: script.into(),
                ..Self::default()
            }
        }
    }

    impl SpeechRecognizer for ScriptedRecognizer {
        fn calibrate(&mut self) -> Result<()> {
            match self.calibration.take() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }

        fn listen(&mut self, window: CaptureWindow) -> Result<Recognition> {
            self.windows.push(window);
            if let Some(session) = &self.disable_during {
                session.set_enabled(false);
            }
            self.script
                .pop_front()
                .unwrap_or(Err(NeonError::ShuttingDown))
        }
    }

    #[derive(Default)]
    struct RecordingSpeaker(Mutex<Vec<String>>);

    impl Speaker for RecordingSpeaker {
        fn speak(&self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }
    }

    #[derive(Default)]
    struct RecordingReporter(Mutex<Vec<StatusMessage>>);

    impl StatusReporter for RecordingReporter {
        fn report(&self, text: &str, active: bool) {
            self.0.lock().unwrap().push(StatusMessage::new(text, active));
        }
    }

    impl RecordingReporter {
        fn texts(&self) -> Vec<String> {
            self.0.lock().unwrap().iter().map(|m| m.text.clone()).collect()
        }
    }

    #[derive(Default)]
    struct RecordingProcessor(Mutex<Vec<String>>);

    impl CommandProcessor for RecordingProcessor {
        fn process(&self, command: &str) -> ActionResult {
            self.0.lock().unwrap().push(command.to_string());
            ActionResult::ok(Tier::AiFallback, "done", "done")
        }
    }

    struct Harness {
        session: Arc<SessionState>,
        speaker: Arc<RecordingSpeaker>,
        reporter: Arc<RecordingReporter>,
        processor: Arc<RecordingProcessor>,
    }

    impl Harness {
        fn new() -> Self {
            let reporter = Arc::new(RecordingReporter::default());
            Self {
                session: Arc::new(SessionState::new("hey alexa", reporter.clone())),
                speaker: Arc::new(RecordingSpeaker::default()),
                reporter,
                processor: Arc::new(RecordingProcessor::default()),
            }
        }

        fn enabled() -> Self {
            let harness = Self::new();
            harness.session.set_enabled(true);
            harness
        }

        fn listener(&self, script: Vec<Result<Recognition>>) -> ListenerLoop<ScriptedRecognizer> {
            let settings = LoopSettings {
                poll_interval: Duration::ZERO,
                error_backoff: Duration::ZERO,
                ..LoopSettings::default()
            };
            ListenerLoop::new(
                ScriptedRecognizer::new(script),
                self.session.clone(),
                self.speaker.clone(),
                self.processor.clone(),
                settings,
            )
        }

        fn spoken(&self) -> Vec<String> {
            self.speaker.0.lock().unwrap().clone()
        }

        fn commands(&self) -> Vec<String> {
            self.processor.0.lock().unwrap().clone()
        }
    }

    fn heard(text: &str) -> Result<Recognition> {
        Ok(Recognition::Heard(text.to_string()))
    }

    // -------------------------------------------------------------------------
    // Single cycles
    // -------------------------------------------------------------------------

    #[test]
    fn test_disabled_cycle_does_not_listen() {
        let harness = Harness::new();
        let mut listener = harness.listener(vec![heard("hey alexa")]);
        assert_eq!(listener.run_cycle().unwrap(), CycleOutcome::Disabled);
        assert!(listener.recognizer.windows.is_empty());
        assert_eq!(harness.session.phase(), ListeningPhase::Idle);
    }

    #[test]
    fn test_wake_then_command() {
        let harness = Harness::enabled();
        let mut listener = harness.listener(vec![heard("hey alexa"), heard("open youtube")]);

        let outcome = listener.run_cycle().unwrap();
        assert!(matches!(outcome, CycleOutcome::Handled(ref r) if r.success));
        assert_eq!(harness.commands(), vec!["open youtube"]);
        assert_eq!(harness.spoken(), vec!["Yes?", "On it."]);
        assert_eq!(harness.session.phase(), ListeningPhase::AwaitingWake);

        let windows = &listener.recognizer.windows;
        assert_eq!(windows[0], CaptureWindow::from_secs(2.0, 4.0));
        assert_eq!(windows[1], CaptureWindow::from_secs(7.0, 10.0));

        let texts = harness.reporter.texts();
        assert_eq!(
            texts,
            vec![
                "Listening for 'hey alexa'...",
                "Listening for command...",
                "Idle - Assistant On",
            ]
        );
    }

    #[test]
    fn test_wake_word_inside_longer_phrase() {
        let harness = Harness::enabled();
        let mut listener =
            harness.listener(vec![heard("okay hey alexa are you there"), heard("what time is it")]);
        assert!(matches!(
            listener.run_cycle().unwrap(),
            CycleOutcome::Handled(_)
        ));
        assert_eq!(harness.commands(), vec!["what time is it"]);
    }

    #[test]
    fn test_no_wake_word_stays_awaiting() {
        let harness = Harness::enabled();
        let mut listener = harness.listener(vec![
            heard("open youtube"),
            Ok(Recognition::Timeout),
            Ok(Recognition::Unintelligible),
        ]);
        for _ in 0..3 {
            assert_eq!(listener.run_cycle().unwrap(), CycleOutcome::NoWake);
        }
        assert!(harness.commands().is_empty());
        assert!(harness.spoken().is_empty());
        assert_eq!(harness.session.phase(), ListeningPhase::AwaitingWake);
    }

    #[test]
    fn test_command_timeout() {
        let harness = Harness::enabled();
        let mut listener = harness.listener(vec![heard("hey alexa"), Ok(Recognition::Timeout)]);
        assert_eq!(listener.run_cycle().unwrap(), CycleOutcome::CommandTimeout);
        assert_eq!(harness.spoken(), vec!["Yes?", "I didn't hear anything."]);
        let texts = harness.reporter.texts();
        assert!(texts.contains(&"Timed out. Idle.".to_string()));
        assert_eq!(texts.last().unwrap(), "Idle - Assistant On");
        assert!(harness.commands().is_empty());
    }

    #[test]
    fn test_command_unintelligible() {
        let harness = Harness::enabled();
        let mut listener =
            harness.listener(vec![heard("hey alexa"), Ok(Recognition::Unintelligible)]);
        assert_eq!(
            listener.run_cycle().unwrap(),
            CycleOutcome::CommandUnintelligible
        );
        assert_eq!(harness.spoken(), vec!["Yes?", "I couldn't understand that."]);
        assert!(harness
            .reporter
            .texts()
            .contains(&"Didn't understand. Idle.".to_string()));
    }

    #[test]
    fn test_one_command_window_per_wake() {
        let harness = Harness::enabled();
        let mut listener = harness.listener(vec![
            heard("hey alexa"),
            heard("open google"),
            heard("open youtube"),
        ]);
        listener.run_cycle().unwrap();
        // The third phrase is treated as a wake attempt, not a command
        assert_eq!(listener.run_cycle().unwrap(), CycleOutcome::NoWake);
        assert_eq!(harness.commands(), vec!["open google"]);
    }

    #[test]
    fn test_disable_between_attempts_returns_to_idle() {
        let harness = Harness::enabled();
        let mut listener = harness.listener(vec![Ok(Recognition::Timeout)]);
        listener.run_cycle().unwrap();
        assert_eq!(harness.session.phase(), ListeningPhase::AwaitingWake);

        harness.session.set_enabled(false);
        assert_eq!(listener.run_cycle().unwrap(), CycleOutcome::Disabled);
        assert_eq!(harness.session.phase(), ListeningPhase::Idle);
    }

    #[test]
    fn test_disable_mid_capture_finishes_current_cycle() {
        let harness = Harness::enabled();
        let mut listener = harness.listener(vec![heard("hey alexa"), heard("open youtube")]);
        listener.recognizer.disable_during = Some(harness.session.clone());

        let outcome = listener.run_cycle().unwrap();
        assert!(matches!(outcome, CycleOutcome::Handled(_)));
        assert_eq!(harness.commands(), vec!["open youtube"]);
        assert!(!harness.session.is_enabled());

        assert_eq!(listener.run_cycle().unwrap(), CycleOutcome::Disabled);
        assert_eq!(listener.recognizer.windows.len(), 2);
        assert_eq!(harness.session.phase(), ListeningPhase::Idle);
    }

    #[test]
    fn test_wake_word_change_takes_effect_next_attempt() {
        let harness = Harness::enabled();
        harness.session.set_wake_word("Jarvis").unwrap();
        let mut listener = harness.listener(vec![heard("hey alexa"), heard("jarvis"), heard("hi")]);
        assert_eq!(listener.run_cycle().unwrap(), CycleOutcome::NoWake);
        assert!(matches!(
            listener.run_cycle().unwrap(),
            CycleOutcome::Handled(_)
        ));
    }

    #[test]
    fn test_error_during_command_still_restores_phase() {
        let harness = Harness::enabled();
        let mut listener = harness.listener(vec![
            heard("hey alexa"),
            Err(NeonError::Recognition("HTTP 503".into())),
        ]);
        let err = listener.run_cycle().unwrap_err();
        assert!(!err.is_fatal());
        assert_eq!(harness.session.phase(), ListeningPhase::AwaitingWake);
        assert_eq!(harness.reporter.texts().last().unwrap(), "Idle - Assistant On");
    }

    // -------------------------------------------------------------------------
    // Full runs
    // -------------------------------------------------------------------------

    #[test]
    fn test_run_recovers_from_transient_errors() {
        let harness = Harness::enabled();
        let mut listener = harness.listener(vec![
            Err(NeonError::Recognition("connection reset".into())),
            heard("hey alexa"),
            heard("what is the date"),
        ]);
        // Script exhaustion yields ShuttingDown, which is fatal
        let err = listener.run().unwrap_err();
        assert!(matches!(err, ListenerError::Core(NeonError::ShuttingDown)));
        assert_eq!(harness.commands(), vec!["what is the date"]);
        assert_eq!(harness.session.phase(), ListeningPhase::Idle);
    }

    #[test]
    fn test_run_halts_on_missing_device() {
        let harness = Harness::enabled();
        let mut listener = harness.listener(vec![heard("hey alexa")]);
        listener.recognizer.calibration =
            Some(NeonError::DeviceUnavailable("no default input device".into()));
        let err = listener.run().unwrap_err();
        assert!(err.is_fatal());
        assert!(listener.recognizer.windows.is_empty());
        assert_eq!(
            harness.reporter.texts().last().unwrap(),
            "Microphone unavailable. Assistant stopped."
        );
    }

    #[test]
    fn test_run_halts_when_device_lost_mid_session() {
        let harness = Harness::enabled();
        let mut listener = harness.listener(vec![
            Ok(Recognition::Timeout),
            Err(NeonError::DeviceUnavailable("input stream closed".into())),
            heard("hey alexa"),
        ]);
        let err = listener.run().unwrap_err();
        assert!(matches!(
            err,
            ListenerError::Core(NeonError::DeviceUnavailable(_))
        ));
        assert_eq!(listener.recognizer.windows.len(), 2);
    }

    #[test]
    fn test_run_exits_on_shutdown() {
        let harness = Harness::new();
        harness.session.request_shutdown();
        let mut listener = harness.listener(vec![]);
        listener.run().unwrap();
        assert!(listener.recognizer.windows.is_empty());
    }
}
