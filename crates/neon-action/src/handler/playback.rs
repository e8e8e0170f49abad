//! Music playback through the browser, from the library or a search.

use crate::error::ActionError;
use crate::handler::{mismatch, ActionHandler, HandlerContext};
use crate::types::{ActionResult, CommandMatch, Tier};

fn play(
    tier: Tier,
    ctx: &HandlerContext,
    status: String,
    song: &str,
    url: &str,
) -> Result<ActionResult, ActionError> {
    let spoken = format!("Playing {}", song);
    ctx.announce(&status, true, &spoken);
    ctx.launcher.open_url(url)?;
    if !ctx.post_playback_pause.is_zero() {
        std::thread::sleep(ctx.post_playback_pause);
    }
    Ok(ActionResult::ok(tier, status, spoken))
}

/// Plays a track from the configured library.
pub struct MusicLibraryHandler;

impl ActionHandler for MusicLibraryHandler {
    fn tier(&self) -> Tier {
        Tier::MusicLibrary
    }

    fn execute(
        &self,
        matched: &CommandMatch,
        ctx: &HandlerContext,
    ) -> Result<ActionResult, ActionError> {
        let CommandMatch::MusicLibrary { title, url } = matched else {
            return Err(mismatch(Tier::MusicLibrary, matched));
        };
        let status = format!("Playing {} from Library...", title);
        play(Tier::MusicLibrary, ctx, status, title, url)
    }

    fn describe(&self, matched: &CommandMatch) -> String {
        match matched {
            CommandMatch::MusicLibrary { title, .. } => format!("Play from library: {}", title),
            _ => "Play from library".to_string(),
        }
    }
}

/// Opens a search results page for anything else the user asked to play.
pub struct WebSearchHandler {
    provider: String,
}

impl WebSearchHandler {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
        }
    }
}

impl ActionHandler for WebSearchHandler {
    fn tier(&self) -> Tier {
        Tier::WebSearch
    }

    fn execute(
        &self,
        matched: &CommandMatch,
        ctx: &HandlerContext,
    ) -> Result<ActionResult, ActionError> {
        let CommandMatch::WebSearch { query, url } = matched else {
            return Err(mismatch(Tier::WebSearch, matched));
        };
        let status = format!("Playing {} on {}...", query, self.provider);
        play(Tier::WebSearch, ctx, status, query, url)
    }

    fn describe(&self, matched: &CommandMatch) -> String {
        match matched {
            CommandMatch::WebSearch { query, .. } => {
                format!("Search {}: {}", self.provider, query)
            }
            _ => format!("Search {}", self.provider),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test_support::Harness;
    use neon_core::status::StatusMessage;

    #[test]
    fn test_library_track() {
        let h = Harness::new();
        let matched = CommandMatch::MusicLibrary {
            title: "skyfall".into(),
            url: "https://www.youtube.com/watch?v=DeumyOzKqgI".into(),
        };
        let result = MusicLibraryHandler.execute(&matched, &h.ctx).unwrap();
        assert_eq!(result.spoken, "Playing skyfall");
        assert_eq!(
            h.statuses(),
            vec![StatusMessage::new("Playing skyfall from Library...", true)]
        );
        assert_eq!(h.urls(), vec!["https://www.youtube.com/watch?v=DeumyOzKqgI"]);
    }

    #[test]
    fn test_web_search() {
        let h = Harness::new();
        let matched = CommandMatch::WebSearch {
            query: "believer".into(),
            url: "https://www.youtube.com/results?search_query=believer".into(),
        };
        let result = WebSearchHandler::new("YouTube")
            .execute(&matched, &h.ctx)
            .unwrap();
        assert_eq!(result.message, "Playing believer on YouTube...");
        assert_eq!(h.spoken(), vec!["Playing believer"]);
        assert_eq!(
            h.urls(),
            vec!["https://www.youtube.com/results?search_query=believer"]
        );
    }

    #[test]
    fn test_describe_search() {
        let matched = CommandMatch::WebSearch {
            query: "lofi beats".into(),
            url: String::new(),
        };
        assert_eq!(
            WebSearchHandler::new("YouTube").describe(&matched),
            "Search YouTube: lofi beats"
        );
    }
}
