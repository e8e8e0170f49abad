//! Action handler registry and trait definition.
//!
//! Each tier has exactly one handler. Handlers perform the side effect for
//! a match and tell the user about it through the status surface and the
//! speaker.

pub mod clock_query;
pub mod fallback;
pub mod playback;
pub mod system_app;
pub mod website;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use neon_chat::ReplyGenerator;
use neon_core::speech::Speaker;
use neon_core::status::StatusReporter;

use crate::clock::Clock;
use crate::error::ActionError;
use crate::launcher::Launcher;
use crate::types::{ActionResult, CommandMatch, Tier};

pub use clock_query::{DateHandler, TimeHandler};
pub use fallback::AiFallbackHandler;
pub use playback::{MusicLibraryHandler, WebSearchHandler};
pub use system_app::SystemAppHandler;
pub use website::WebsiteHandler;

/// Collaborators every handler may use.
#[derive(Clone)]
pub struct HandlerContext {
    pub reporter: Arc<dyn StatusReporter>,
    pub speaker: Arc<dyn Speaker>,
    pub launcher: Arc<dyn Launcher>,
    /// Hold after handing a track to the browser so playback can start
    /// before the microphone reopens.
    pub post_playback_pause: Duration,
}

impl HandlerContext {
    /// Report a status line, then speak.
    pub fn announce(&self, status: &str, active: bool, spoken: &str) {
        self.reporter.report(status, active);
        self.speaker.speak(spoken);
    }
}

/// Executes the side effect for one tier.
pub trait ActionHandler: Send + Sync {
    fn tier(&self) -> Tier;

    fn execute(
        &self,
        matched: &CommandMatch,
        ctx: &HandlerContext,
    ) -> Result<ActionResult, ActionError>;

    /// Short human-readable description of what `execute` would do.
    fn describe(&self, matched: &CommandMatch) -> String;
}

pub(crate) fn mismatch(expected: Tier, matched: &CommandMatch) -> ActionError {
    ActionError::MismatchedCommand {
        expected,
        actual: matched.tier(),
    }
}

/// Handlers keyed by tier.
#[derive(Default)]
pub struct ActionRegistry {
    handlers: HashMap<Tier, Box<dyn ActionHandler>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a handler for every tier.
    pub fn with_defaults(
        clock: Arc<dyn Clock>,
        generator: Arc<dyn ReplyGenerator>,
        search_provider: &str,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(WebsiteHandler));
        registry.register(Box::new(TimeHandler::new(clock.clone())));
        registry.register(Box::new(DateHandler::new(clock)));
        registry.register(Box::new(SystemAppHandler));
        registry.register(Box::new(MusicLibraryHandler));
        registry.register(Box::new(WebSearchHandler::new(search_provider)));
        registry.register(Box::new(AiFallbackHandler::new(generator)));
        registry
    }

    /// Register a handler, replacing any previous one for the same tier.
    pub fn register(&mut self, handler: Box<dyn ActionHandler>) {
        self.handlers.insert(handler.tier(), handler);
    }

    pub fn get(&self, tier: Tier) -> Option<&dyn ActionHandler> {
        self.handlers.get(&tier).map(|h| h.as_ref())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
