//! Local application launcher.

use crate::error::ActionError;
use crate::handler::{mismatch, ActionHandler, HandlerContext};
use crate::types::{ActionResult, CommandMatch, Tier};

/// Starts a configured desktop application.
pub struct SystemAppHandler;

impl ActionHandler for SystemAppHandler {
    fn tier(&self) -> Tier {
        Tier::SystemApp
    }

    fn execute(
        &self,
        matched: &CommandMatch,
        ctx: &HandlerContext,
    ) -> Result<ActionResult, ActionError> {
        let CommandMatch::SystemApp {
            name,
            executable,
            args,
        } = matched
        else {
            return Err(mismatch(Tier::SystemApp, matched));
        };

        let status = format!("Opening {}...", name);
        let spoken = format!("Opening {}", name);
        ctx.announce(&status, true, &spoken);
        ctx.launcher.launch_process(executable, args)?;

        Ok(ActionResult::ok(Tier::SystemApp, status, spoken))
    }

    fn describe(&self, matched: &CommandMatch) -> String {
        match matched {
            CommandMatch::SystemApp { executable, .. } => format!("Launch: {}", executable),
            _ => "Launch application".to_string(),
        }
    }
}
