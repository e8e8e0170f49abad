//! Wiring for the listener worker.

use std::sync::Arc;

use neon_action::{
    ActionRegistry, CommandProcessor, Dispatcher, HandlerContext, Launcher, Orchestrator,
    SystemClock, SystemLauncher,
};
use neon_audio::{MicrophoneRecognizer, SystemSpeaker};
use neon_chat::{GeminiClient, ReplyGenerator};
use neon_core::config::NeonConfig;
use neon_core::speech::Speaker;
use neon_core::status::StatusReporter;
use neon_listener::{ListenerError, ListenerLoop, LoopSettings, SessionState};

/// Build the dispatcher, handlers and their collaborators.
pub fn build_orchestrator(
    config: &NeonConfig,
    reporter: Arc<dyn StatusReporter>,
    speaker: Arc<dyn Speaker>,
) -> Orchestrator {
    let generator = GeminiClient::from_env(&config.ai);
    if !generator.has_api_key() {
        tracing::warn!(
            env = %config.ai.api_key_env,
            "Generative fallback key not set; unmatched commands will get a canned reply"
        );
    }
    let generator: Arc<dyn ReplyGenerator> = Arc::new(generator);
    let launcher: Arc<dyn Launcher> = Arc::new(SystemLauncher);

    let registry = ActionRegistry::with_defaults(
        Arc::new(SystemClock),
        generator,
        &config.search.provider,
    );
    let ctx = HandlerContext {
        reporter,
        speaker,
        launcher,
        post_playback_pause: config.assistant.post_playback_pause(),
    };
    let dispatcher = Dispatcher::from_config(config);
    tracing::info!(tiers = ?dispatcher.tiers(), handlers = registry.len(), "Dispatcher ready");
    Orchestrator::new(dispatcher, registry, ctx)
}

/// Run the listener loop on the current thread until shutdown.
///
/// The microphone handle is created here so it never leaves the worker
/// thread.
pub fn run_worker(
    config: NeonConfig,
    session: Arc<SessionState>,
    speaker: Arc<dyn Speaker>,
    processor: Arc<dyn CommandProcessor>,
) -> Result<(), ListenerError> {
    let recognizer = match MicrophoneRecognizer::open(&config.recognizer) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "Speech recognizer unavailable");
            session
                .reporter()
                .report("Microphone unavailable. Assistant stopped.", false);
            return Err(e.into());
        }
    };
    let settings = LoopSettings::from_config(&config.assistant);
    ListenerLoop::new(recognizer, session, speaker, processor, settings).run()
}

/// Speaker shared by the handlers and the loop.
pub fn build_speaker(config: &NeonConfig) -> Arc<dyn Speaker> {
    Arc::new(SystemSpeaker::new(&config.speech))
}
