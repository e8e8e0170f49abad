//! Domain types for command routing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Intent tiers in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Website,
    TimeQuery,
    DateQuery,
    SystemApp,
    MusicLibrary,
    WebSearch,
    AiFallback,
}

impl Tier {
    pub const ALL: [Tier; 7] = [
        Tier::Website,
        Tier::TimeQuery,
        Tier::DateQuery,
        Tier::SystemApp,
        Tier::MusicLibrary,
        Tier::WebSearch,
        Tier::AiFallback,
    ];
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Website => write!(f, "website"),
            Tier::TimeQuery => write!(f, "time_query"),
            Tier::DateQuery => write!(f, "date_query"),
            Tier::SystemApp => write!(f, "system_app"),
            Tier::MusicLibrary => write!(f, "music_library"),
            Tier::WebSearch => write!(f, "web_search"),
            Tier::AiFallback => write!(f, "ai_fallback"),
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "website" => Ok(Tier::Website),
            "time_query" => Ok(Tier::TimeQuery),
            "date_query" => Ok(Tier::DateQuery),
            "system_app" => Ok(Tier::SystemApp),
            "music_library" => Ok(Tier::MusicLibrary),
            "web_search" => Ok(Tier::WebSearch),
            "ai_fallback" => Ok(Tier::AiFallback),
            _ => Err(format!("Unknown tier: {}", s)),
        }
    }
}

/// The single decision the dispatcher makes for a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum CommandMatch {
    Website {
        keyword: String,
        url: String,
    },
    TimeQuery,
    DateQuery,
    SystemApp {
        name: String,
        executable: String,
        args: Vec<String>,
    },
    MusicLibrary {
        title: String,
        url: String,
    },
    WebSearch {
        query: String,
        url: String,
    },
    AiFallback {
        prompt: String,
    },
}

impl CommandMatch {
    pub fn tier(&self) -> Tier {
        match self {
            CommandMatch::Website { .. } => Tier::Website,
            CommandMatch::TimeQuery => Tier::TimeQuery,
            CommandMatch::DateQuery => Tier::DateQuery,
            CommandMatch::SystemApp { .. } => Tier::SystemApp,
            CommandMatch::MusicLibrary { .. } => Tier::MusicLibrary,
            CommandMatch::WebSearch { .. } => Tier::WebSearch,
            CommandMatch::AiFallback { .. } => Tier::AiFallback,
        }
    }
}

/// Result returned by action handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub tier: Tier,
    pub success: bool,
    /// Text shown on the status surface.
    pub message: String,
    /// Text spoken to the user.
    pub spoken: String,
}

impl ActionResult {
    pub fn ok(tier: Tier, message: impl Into<String>, spoken: impl Into<String>) -> Self {
        Self {
            tier,
            success: true,
            message: message.into(),
            spoken: spoken.into(),
        }
    }

    pub fn failed(tier: Tier, message: impl Into<String>, spoken: impl Into<String>) -> Self {
        Self {
            tier,
            success: false,
            message: message.into(),
            spoken: spoken.into(),
        }
    }
}

/// Capitalize the first letter of every word, lowercasing the rest.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
