//! Generative conversational fallback.

use std::sync::Arc;

use neon_chat::{resolve_fallback, ReplyGenerator};

use crate::error::ActionError;
use crate::handler::{mismatch, ActionHandler, HandlerContext};
use crate::types::{ActionResult, CommandMatch, Tier};

/// Hands unmatched commands to the language model and speaks the reply.
pub struct AiFallbackHandler {
    generator: Arc<dyn ReplyGenerator>,
}

impl AiFallbackHandler {
    pub fn new(generator: Arc<dyn ReplyGenerator>) -> Self {
        Self { generator }
    }
}

impl ActionHandler for AiFallbackHandler {
    fn tier(&self) -> Tier {
        Tier::AiFallback
    }

    fn execute(
        &self,
        matched: &CommandMatch,
        ctx: &HandlerContext,
    ) -> Result<ActionResult, ActionError> {
        let CommandMatch::AiFallback { prompt } = matched else {
            return Err(mismatch(Tier::AiFallback, matched));
        };

        ctx.reporter.report("Thinking...", true);
        let reply = resolve_fallback(self.generator.as_ref(), prompt);
        let text = reply.spoken_text().to_string();
        ctx.announce(&text, !reply.is_failure(), &text);

        if reply.is_failure() {
            Ok(ActionResult::failed(Tier::AiFallback, text.clone(), text))
        } else {
            Ok(ActionResult::ok(Tier::AiFallback, text.clone(), text))
        }
    }

    fn describe(&self, matched: &CommandMatch) -> String {
        match matched {
            CommandMatch::AiFallback { prompt } => format!("Ask the assistant: {}", prompt),
            _ => "Ask the assistant".to_string(),
        }
    }
}
