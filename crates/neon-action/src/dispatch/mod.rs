//! Ordered tier table.
//!
//! Rules are evaluated top to bottom and the first claim wins. When no rule
//! claims a command it goes to the generative fallback, so dispatch always
//! produces a decision.

pub mod rules;

use neon_core::config::NeonConfig;

use crate::types::{CommandMatch, Tier};

pub use rules::{
    strip_play, DateQueryRule, MusicLibraryRule, SystemAppRule, TierRule, TimeQueryRule,
    WebSearchRule, WebsiteRule,
};

/// Pure text-to-decision router.
pub struct Dispatcher {
    rules: Vec<Box<dyn TierRule>>,
}

impl Dispatcher {
    /// Build a dispatcher from an explicit rule list. Rules are evaluated in
    /// the order given.
    pub fn new(rules: Vec<Box<dyn TierRule>>) -> Self {
        Self { rules }
    }

    /// The standard six-tier table driven by the shortcut sections of the
    /// configuration.
    pub fn from_config(config: &NeonConfig) -> Self {
        Self::new(vec![
            Box::new(WebsiteRule::new(config.sites.clone())),
            Box::new(TimeQueryRule),
            Box::new(DateQueryRule),
            Box::new(SystemAppRule::new(config.apps.clone())),
            Box::new(MusicLibraryRule::new(config.music.clone())),
            Box::new(WebSearchRule::new(config.search.url_template.clone())),
        ])
    }

    /// Tiers in evaluation order, ending with the fallback.
    pub fn tiers(&self) -> Vec<Tier> {
        self.rules
            .iter()
            .map(|r| r.tier())
            .chain(std::iter::once(Tier::AiFallback))
            .collect()
    }

    /// Classify a lowercased command.
    pub fn dispatch(&self, command: &str) -> CommandMatch {
        for rule in &self.rules {
            if let Some(matched) = rule.try_match(command) {
                tracing::debug!(tier = %matched.tier(), "Command matched");
                return matched;
            }
        }
        CommandMatch::AiFallback {
            prompt: command.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neon_core::config::{AppShortcut, Track};

    fn dispatcher() -> Dispatcher {
        let mut config = NeonConfig::default();
        config.apps = vec![
            AppShortcut {
                phrase: "open calculator".into(),
                name: "Calculator".into(),
                executable: "calc.exe".into(),
                args: vec![],
            },
            AppShortcut {
                phrase: "open notepad".into(),
                name: "Notepad".into(),
                executable: "notepad.exe".into(),
                args: vec![],
            },
        ];
        config.music = vec![
            Track {
                title: "skyfall".into(),
                url: "https://www.youtube.com/watch?v=DeumyOzKqgI".into(),
            },
            Track {
                title: "believer".into(),
                url: "https://www.youtube.com/watch?v=7wtfhZwyrcc".into(),
            },
        ];
        Dispatcher::from_config(&config)
    }

    #[test]
    fn test_tier_order() {
        assert_eq!(dispatcher().tiers(), Tier::ALL.to_vec());
    }

    #[test]
    fn test_every_site_with_open_or_launch() {
        let d = dispatcher();
        for site in ["youtube", "google", "facebook", "instagram", "linkedin"] {
            for command in [
                format!("open {}", site),
                format!("launch {}", site),
                format!("{} open", site),
            ] {
                assert_eq!(
                    d.dispatch(&command),
                    CommandMatch::Website {
                        keyword: site.to_string(),
                        url: format!("https://www.{}.com", site),
                    },
                    "command: {}",
                    command
                );
            }
        }
    }

    #[test]
    fn test_bare_site_keyword() {
        let d = dispatcher();
        assert_eq!(d.dispatch(" youtube ").tier(), Tier::Website);
        assert_eq!(d.dispatch("linkedin").tier(), Tier::Website);
    }

    #[test]
    fn test_casual_site_mention_is_not_website() {
        let d = dispatcher();
        assert_eq!(
            d.dispatch("is google down today").tier(),
            Tier::AiFallback
        );
    }

    #[test]
    fn test_time_and_date() {
        let d = dispatcher();
        assert_eq!(d.dispatch("what time is it"), CommandMatch::TimeQuery);
        assert_eq!(d.dispatch("what's the date"), CommandMatch::DateQuery);
        // Both words present: time is evaluated first
        assert_eq!(
            d.dispatch("what time and date is it"),
            CommandMatch::TimeQuery
        );
    }

    #[test]
    fn test_system_app() {
        let d = dispatcher();
        assert_eq!(
            d.dispatch("open notepad"),
            CommandMatch::SystemApp {
                name: "Notepad".into(),
                executable: "notepad.exe".into(),
                args: vec![],
            }
        );
    }

    #[test]
    fn test_music_library_beats_web_search() {
        let d = dispatcher();
        assert_eq!(d.dispatch("play skyfall").tier(), Tier::MusicLibrary);
        assert_eq!(d.dispatch("play believer").tier(), Tier::MusicLibrary);
    }

    #[test]
    fn test_unknown_song_is_web_search() {
        let d = dispatcher();
        match d.dispatch("play bohemian rhapsody") {
            CommandMatch::WebSearch { query, url } => {
                assert_eq!(query, "bohemian rhapsody");
                assert!(url.ends_with("search_query=bohemian%20rhapsody"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_play_believer_without_library() {
        let d = Dispatcher::from_config(&NeonConfig::default());
        match d.dispatch("play believer") {
            CommandMatch::WebSearch { query, .. } => assert_eq!(query, "believer"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bare_play_falls_through() {
        let d = dispatcher();
        assert_eq!(
            d.dispatch("play"),
            CommandMatch::AiFallback {
                prompt: "play".into()
            }
        );
    }

    #[test]
    fn test_empty_command_is_fallback() {
        let d = dispatcher();
        assert_eq!(
            d.dispatch(""),
            CommandMatch::AiFallback {
                prompt: String::new()
            }
        );
    }

    #[test]
    fn test_unmatched_is_fallback() {
        let d = dispatcher();
        for command in ["tell me a joke", "how tall is everest", "thanks"] {
            assert_eq!(d.dispatch(command).tier(), Tier::AiFallback);
        }
    }

    #[test]
    fn test_site_precedes_system_app() {
        let d = dispatcher();
        // Contains both a site keyword with "open" and an app phrase
        assert_eq!(
            d.dispatch("open calculator on google").tier(),
            Tier::Website
        );
    }

    #[test]
    fn test_youtube_search_containing_app_name() {
        let d = dispatcher();
        assert_eq!(
            d.dispatch("play open notepad tutorial").tier(),
            Tier::SystemApp
        );
    }

    #[test]
    fn test_custom_rule_table() {
        let d = Dispatcher::new(vec![Box::new(TimeQueryRule)]);
        assert_eq!(d.tiers(), vec![Tier::TimeQuery, Tier::AiFallback]);
        assert_eq!(d.dispatch("open youtube").tier(), Tier::AiFallback);
    }
}
