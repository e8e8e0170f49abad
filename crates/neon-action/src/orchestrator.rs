//! Command orchestrator.
//!
//! Routes a recognized command through the dispatcher and runs the handler
//! registered for the winning tier. Handler failures are turned into a
//! spoken apology so they never reach the listener loop.

use crate::dispatch::Dispatcher;
use crate::handler::{ActionRegistry, HandlerContext};
use crate::types::{title_case, ActionResult, CommandMatch, Tier};

/// Anything that can carry out a recognized command.
pub trait CommandProcessor: Send + Sync {
    fn process(&self, command: &str) -> ActionResult;
}

/// Dispatcher plus handler registry.
pub struct Orchestrator {
    dispatcher: Dispatcher,
    registry: ActionRegistry,
    ctx: HandlerContext,
}

impl Orchestrator {
    pub fn new(dispatcher: Dispatcher, registry: ActionRegistry, ctx: HandlerContext) -> Self {
        Self {
            dispatcher,
            registry,
            ctx,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Classify and execute a command.
    pub fn handle(&self, command: &str) -> ActionResult {
        let matched = self.dispatcher.dispatch(command);
        let tier = matched.tier();

        let Some(handler) = self.registry.get(tier) else {
            tracing::error!(tier = %tier, "No handler registered");
            return self.apologize(tier, "No handler available.");
        };

        tracing::info!(tier = %tier, action = %handler.describe(&matched), "Executing command");
        match handler.execute(&matched, &self.ctx) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(tier = %tier, error = %e, "Command handler failed");
                self.apologize(tier, &failure_status(&matched))
            }
        }
    }

    fn apologize(&self, tier: Tier, status: &str) -> ActionResult {
        let spoken = "Sorry, I couldn't do that.";
        self.ctx.announce(status, false, spoken);
        ActionResult::failed(tier, status, spoken)
    }
}

fn failure_status(matched: &CommandMatch) -> String {
    match matched {
        CommandMatch::Website { keyword, .. } => {
            format!("Couldn't open {}.", title_case(keyword))
        }
        CommandMatch::SystemApp { name, .. } => format!("Couldn't open {}.", name),
        CommandMatch::MusicLibrary { title, .. } => format!("Couldn't play {}.", title),
        CommandMatch::WebSearch { query, .. } => format!("Couldn't play {}.", query),
        _ => "Something went wrong.".to_string(),
    }
}

impl CommandProcessor for Orchestrator {
    fn process(&self, command: &str) -> ActionResult {
        self.handle(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::NaiveDate;
    use neon_chat::{ChatError, ReplyGenerator};
    use neon_core::config::NeonConfig;
    use neon_core::status::StatusMessage;

    use crate::clock::FixedClock;
    use crate::handler::test_support::Harness;
    use crate::handler::WebsiteHandler;

    struct NoKey;

    impl ReplyGenerator for NoKey {
        fn generate(&self, _prompt: &str) -> Result<String, ChatError> {
            Err(ChatError::MissingApiKey("GEMINI_API_KEY".into()))
        }
    }

    fn orchestrator(h: &Harness) -> Orchestrator {
        let clock = Arc::new(FixedClock(
            NaiveDate::from_ymd_opt(2026, 10, 15)
                .unwrap()
                .and_hms_opt(9, 41, 0)
                .unwrap(),
        ));
        Orchestrator::new(
            Dispatcher::from_config(&NeonConfig::default()),
            ActionRegistry::with_defaults(clock, Arc::new(NoKey), "YouTube"),
            h.ctx.clone(),
        )
    }

    #[test]
    fn test_what_time_is_it() {
        let h = Harness::new();
        let result = orchestrator(&h).handle("what time is it");
        assert_eq!(result.tier, Tier::TimeQuery);
        assert_eq!(h.spoken(), vec!["The time is 09:41 AM"]);
    }

    #[test]
    fn test_open_youtube() {
        let h = Harness::new();
        let result = orchestrator(&h).handle("open youtube");
        assert_eq!(result.tier, Tier::Website);
        assert_eq!(h.spoken(), vec!["Opening Youtube"]);
        assert_eq!(h.urls(), vec!["https://www.youtube.com"]);
    }

    #[test]
    fn test_missing_key_fallback() {
        let h = Harness::new();
        let result = orchestrator(&h).handle("tell me a joke");
        assert_eq!(result.tier, Tier::AiFallback);
        assert_eq!(h.spoken(), vec!["I cannot find my API key."]);
    }

    #[test]
    fn test_play_unknown_song_searches() {
        let h = Harness::new();
        orchestrator(&h).handle("play believer");
        assert_eq!(
            h.urls(),
            vec!["https://www.youtube.com/results?search_query=believer"]
        );
        assert_eq!(h.spoken(), vec!["Playing believer"]);
    }

    #[test]
    fn test_handler_failure_is_apology() {
        let h = Harness::failing();
        let result = orchestrator(&h).handle("open google");
        assert!(!result.success);
        assert_eq!(
            h.spoken(),
            vec!["Opening Google", "Sorry, I couldn't do that."]
        );
        assert_eq!(
            h.statuses().last().cloned().unwrap(),
            StatusMessage::new("Couldn't open Google.", false)
        );
    }

    #[test]
    fn test_missing_handler_is_apology() {
        let h = Harness::new();
        let mut registry = ActionRegistry::new();
        registry.register(Box::new(WebsiteHandler));
        let orch = Orchestrator::new(
            Dispatcher::from_config(&NeonConfig::default()),
            registry,
            h.ctx.clone(),
        );
        let result = orch.process("what time is it");
        assert!(!result.success);
        assert_eq!(result.tier, Tier::TimeQuery);
        assert_eq!(h.spoken(), vec!["Sorry, I couldn't do that."]);
    }
}
