//! Website shortcut handler.

use crate::error::ActionError;
use crate::handler::{mismatch, ActionHandler, HandlerContext};
use crate::types::{title_case, ActionResult, CommandMatch, Tier};

/// Opens a configured site in the default browser.
pub struct WebsiteHandler;

impl ActionHandler for WebsiteHandler {
    fn tier(&self) -> Tier {
        Tier::Website
    }

    fn execute(
        &self,
        matched: &CommandMatch,
        ctx: &HandlerContext,
    ) -> Result<ActionResult, ActionError> {
        let CommandMatch::Website { keyword, url } = matched else {
            return Err(mismatch(Tier::Website, matched));
        };

        let name = title_case(keyword);
        let status = format!("Opening {}...", name);
        let spoken = format!("Opening {}", name);
        ctx.announce(&status, true, &spoken);
        ctx.launcher.open_url(url)?;

        Ok(ActionResult::ok(Tier::Website, status, spoken))
    }

    fn describe(&self, matched: &CommandMatch) -> String {
        match matched {
            CommandMatch::Website { url, .. } => format!("Open URL: {}", url),
            _ => "Open website".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test_support::Harness;
    use neon_core::status::StatusMessage;

    fn youtube() -> CommandMatch {
        CommandMatch::Website {
            keyword: "youtube".into(),
            url: "https://www.youtube.com".into(),
        }
    }

    #[test]
    fn test_open_youtube() {
        let h = Harness::new();
        let result = WebsiteHandler.execute(&youtube(), &h.ctx).unwrap();

        assert!(result.success);
        assert_eq!(result.spoken, "Opening Youtube");
        assert_eq!(h.spoken(), vec!["Opening Youtube"]);
        assert_eq!(
            h.statuses(),
            vec![StatusMessage::new("Opening Youtube...", true)]
        );
        assert_eq!(h.urls(), vec!["https://www.youtube.com"]);
    }

    #[test]
    fn test_launch_failure_propagates() {
        let h = Harness::failing();
        let err = WebsiteHandler.execute(&youtube(), &h.ctx).unwrap_err();
        assert!(matches!(err, ActionError::Launch(_)));
    }

    #[test]
    fn test_rejects_other_tiers() {
        let h = Harness::new();
        let err = WebsiteHandler
            .execute(&CommandMatch::TimeQuery, &h.ctx)
            .unwrap_err();
        assert!(matches!(err, ActionError::MismatchedCommand { .. }));
        assert!(h.spoken().is_empty());
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            WebsiteHandler.describe(&youtube()),
            "Open URL: https://www.youtube.com"
        );
    }
}
