//! Individual tier rules.
//!
//! Each rule inspects an already-lowercased command and either claims it
//! or passes. Rules never perform side effects.

use std::sync::OnceLock;

use regex::Regex;

use neon_core::config::{AppShortcut, SiteShortcut, Track};

use crate::types::{CommandMatch, Tier};

/// One row of the ordered tier table.
pub trait TierRule: Send + Sync {
    fn tier(&self) -> Tier;
    fn try_match(&self, command: &str) -> Option<CommandMatch>;
}

/// Site keyword plus "open"/"launch", or the bare keyword on its own.
pub struct WebsiteRule {
    sites: Vec<SiteShortcut>,
}

impl WebsiteRule {
    pub fn new(sites: Vec<SiteShortcut>) -> Self {
        let sites = sites
            .into_iter()
            .map(|s| SiteShortcut {
                keyword: s.keyword.trim().to_lowercase(),
                url: s.url,
            })
            .filter(|s| !s.keyword.is_empty())
            .collect();
        Self { sites }
    }
}

impl TierRule for WebsiteRule {
    fn tier(&self) -> Tier {
        Tier::Website
    }

    fn try_match(&self, command: &str) -> Option<CommandMatch> {
        let has_verb = command.contains("open") || command.contains("launch");
        let trimmed = command.trim();
        self.sites
            .iter()
            .find(|site| {
                command.contains(site.keyword.as_str())
                    && (has_verb || trimmed == site.keyword)
            })
            .map(|site| CommandMatch::Website {
                keyword: site.keyword.clone(),
                url: site.url.clone(),
            })
    }
}

/// "what" together with "time".
pub struct TimeQueryRule;

impl TierRule for TimeQueryRule {
    fn tier(&self) -> Tier {
        Tier::TimeQuery
    }

    fn try_match(&self, command: &str) -> Option<CommandMatch> {
        (command.contains("what") && command.contains("time")).then_some(CommandMatch::TimeQuery)
    }
}

/// "what" together with "date".
pub struct DateQueryRule;

impl TierRule for DateQueryRule {
    fn tier(&self) -> Tier {
        Tier::DateQuery
    }

    fn try_match(&self, command: &str) -> Option<CommandMatch> {
        (command.contains("what") && command.contains("date")).then_some(CommandMatch::DateQuery)
    }
}

/// Exact launch phrase such as "open calculator".
pub struct SystemAppRule {
    apps: Vec<AppShortcut>,
}

impl SystemAppRule {
    pub fn new(apps: Vec<AppShortcut>) -> Self {
        let apps = apps
            .into_iter()
            .map(|a| AppShortcut {
                phrase: a.phrase.trim().to_lowercase(),
                ..a
            })
            .filter(|a| !a.phrase.is_empty())
            .collect();
        Self { apps }
    }
}

impl TierRule for SystemAppRule {
    fn tier(&self) -> Tier {
        Tier::SystemApp
    }

    fn try_match(&self, command: &str) -> Option<CommandMatch> {
        self.apps
            .iter()
            .find(|app| command.contains(app.phrase.as_str()))
            .map(|app| CommandMatch::SystemApp {
                name: app.name.clone(),
                executable: app.executable.clone(),
                args: app.args.clone(),
            })
    }
}

/// Any library title that appears in the command, in library order.
pub struct MusicLibraryRule {
    tracks: Vec<Track>,
}

impl MusicLibraryRule {
    pub fn new(tracks: Vec<Track>) -> Self {
        let tracks = tracks
            .into_iter()
            .map(|t| Track {
                title: t.title.trim().to_lowercase(),
                url: t.url,
            })
            .filter(|t| !t.title.is_empty())
            .collect();
        Self { tracks }
    }
}

impl TierRule for MusicLibraryRule {
    fn tier(&self) -> Tier {
        Tier::MusicLibrary
    }

    fn try_match(&self, command: &str) -> Option<CommandMatch> {
        self.tracks
            .iter()
            .find(|track| command.contains(track.title.as_str()))
            .map(|track| CommandMatch::MusicLibrary {
                title: track.title.clone(),
                url: track.url.clone(),
            })
    }
}

/// "play" followed by anything else becomes a search.
pub struct WebSearchRule {
    url_template: String,
}

impl WebSearchRule {
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
        }
    }

    fn search_url(&self, query: &str) -> String {
        self.url_template
            .replace("{query}", &urlencoding::encode(query))
    }
}

fn play_word() -> &'static Regex {
    static PLAY: OnceLock<Regex> = OnceLock::new();
    PLAY.get_or_init(|| Regex::new(r"\bplay\b").expect("Invalid play regex"))
}

/// Remove every standalone "play" and normalize whitespace.
pub fn strip_play(command: &str) -> String {
    play_word()
        .replace_all(command, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl TierRule for WebSearchRule {
    fn tier(&self) -> Tier {
        Tier::WebSearch
    }

    fn try_match(&self, command: &str) -> Option<CommandMatch> {
        if !command.contains("play") {
            return None;
        }
        let query = strip_play(command);
        if query.is_empty() {
            return None;
        }
        let url = self.search_url(&query);
        Some(CommandMatch::WebSearch { query, url })
    }
}
