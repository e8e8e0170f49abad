use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{NeonError, Result};
use crate::speech::CaptureWindow;

/// Wake word assigned to every new account.
pub const DEFAULT_WAKE_WORD: &str = "hey alexa";

/// Top-level configuration for the Neon assistant.
///
/// Loaded from `~/.neon/config.toml` by default. Each section corresponds
/// to one subsystem; the shortcut tables (`sites`, `apps`, `music`) drive
/// the command dispatcher and are matched in the order they appear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeonConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub recognizer: RecognizerConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default = "default_sites")]
    pub sites: Vec<SiteShortcut>,
    #[serde(default = "default_apps")]
    pub apps: Vec<AppShortcut>,
    #[serde(default)]
    pub music: Vec<Track>,
}

impl Default for NeonConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            assistant: AssistantConfig::default(),
            speech: SpeechConfig::default(),
            recognizer: RecognizerConfig::default(),
            ai: AiConfig::default(),
            search: SearchConfig::default(),
            sites: default_sites(),
            apps: default_apps(),
            music: Vec::new(),
        }
    }
}

impl NeonConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: NeonConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| NeonError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Data directory with a leading `~` expanded to the user's home.
    pub fn data_dir(&self) -> PathBuf {
        expand_home(&self.general.data_dir)
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        Some(rest) => home_dir().join(rest),
        None => PathBuf::from(path),
    }
}

fn home_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    let home = std::env::var("USERPROFILE");
    #[cfg(not(target_os = "windows"))]
    let home = std::env::var("HOME");
    PathBuf::from(home.unwrap_or_else(|_| ".".to_string()))
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the account database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.neon/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Listener loop timing and spoken phrases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Sleep between enable-flag checks while the assistant is off.
    pub poll_interval_ms: u64,
    /// Seconds to wait for speech to start while listening for the wake word.
    pub wake_timeout_secs: f32,
    /// Maximum wake phrase length in seconds.
    pub wake_phrase_limit_secs: f32,
    /// Seconds to wait for speech to start after the wake word.
    pub command_timeout_secs: f32,
    /// Maximum command phrase length in seconds.
    pub command_phrase_limit_secs: f32,
    /// Pause after an unexpected failure before the next cycle.
    pub error_backoff_ms: u64,
    /// Pause after handing a track to the browser.
    pub post_playback_pause_ms: u64,
    /// Spoken after the wake word is detected.
    pub wake_ack: String,
    /// Spoken after a command has been heard.
    pub command_ack: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            wake_timeout_secs: 2.0,
            wake_phrase_limit_secs: 4.0,
            command_timeout_secs: 7.0,
            command_phrase_limit_secs: 10.0,
            error_backoff_ms: 1000,
            post_playback_pause_ms: 3000,
            wake_ack: "Yes?".to_string(),
            command_ack: "On it.".to_string(),
        }
    }
}

impl AssistantConfig {
    pub fn wake_window(&self) -> CaptureWindow {
        CaptureWindow::from_secs(self.wake_timeout_secs, self.wake_phrase_limit_secs)
    }

    pub fn command_window(&self) -> CaptureWindow {
        CaptureWindow::from_secs(self.command_timeout_secs, self.command_phrase_limit_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }

    pub fn post_playback_pause(&self) -> Duration {
        Duration::from_millis(self.post_playback_pause_ms)
    }
}

/// Speech synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Explicit voice name. Overrides `prefer_alternate_voice`.
    pub voice: Option<String>,
    /// Use the second installed voice when more than one is available.
    pub prefer_alternate_voice: bool,
    /// Speaking rate in words per minute.
    pub rate_wpm: u32,
    /// Volume from 0.0 to 1.0.
    pub volume: f32,
    /// Silence held after each utterance.
    pub settle_ms: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            voice: None,
            prefer_alternate_voice: true,
            rate_wpm: 140,
            volume: 1.0,
            settle_ms: 1000,
        }
    }
}

/// Speech recognition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Initial energy threshold on the 16-bit RMS scale.
    pub energy_threshold: f32,
    /// Keep adapting the threshold while listening.
    pub dynamic_energy: bool,
    /// Ambient calibration length at startup.
    pub calibration_secs: f32,
    /// Seconds of silence that end a phrase.
    pub pause_threshold_secs: f32,
    /// Capture sample rate in Hz.
    pub sample_rate: u32,
    /// BCP-47 language code sent to the recognition service.
    pub language: String,
    /// Recognition service endpoint.
    pub endpoint: String,
    /// Environment variable holding the recognition API key.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            energy_threshold: 400.0,
            dynamic_energy: false,
            calibration_secs: 1.0,
            pause_threshold_secs: 0.8,
            sample_rate: 16_000,
            language: "en-US".to_string(),
            endpoint: "https://speech.googleapis.com/v1/speech:recognize".to_string(),
            api_key_env: "GOOGLE_SPEECH_API_KEY".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Generative fallback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Model name.
    pub model: String,
    /// API base URL.
    pub endpoint: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// URL template; `{query}` is replaced by the encoded query.
    pub url_template: String,
    /// Service name used in status messages.
    pub provider: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url_template: "https://www.youtube.com/results?search_query={query}".to_string(),
            provider: "YouTube".to_string(),
        }
    }
}

/// A website opened by keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteShortcut {
    pub keyword: String,
    pub url: String,
}

impl SiteShortcut {
    pub fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            url: format!("https://www.{keyword}.com"),
        }
    }
}

/// A local application launched by phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppShortcut {
    /// Phrase that must appear in the command, e.g. "open calculator".
    pub phrase: String,
    /// Display name used in status and speech.
    pub name: String,
    pub executable: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// A music library entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub url: String,
}

fn default_sites() -> Vec<SiteShortcut> {
    ["youtube", "google", "facebook", "instagram", "linkedin"]
        .into_iter()
        .map(SiteShortcut::new)
        .collect()
}

fn app(phrase: &str, name: &str, executable: &str, args: &[&str]) -> AppShortcut {
    AppShortcut {
        phrase: phrase.to_string(),
        name: name.to_string(),
        executable: executable.to_string(),
        args: args.iter().map(|a| a.to_string()).collect(),
    }
}

#[cfg(target_os = "windows")]
fn default_apps() -> Vec<AppShortcut> {
    vec![
        app("open calculator", "Calculator", "calc.exe", &[]),
        app("open notepad", "Notepad", "notepad.exe", &[]),
    ]
}

#[cfg(target_os = "macos")]
fn default_apps() -> Vec<AppShortcut> {
    vec![
        app("open calculator", "Calculator", "open", &["-a", "Calculator"]),
        app("open notepad", "Notepad", "open", &["-a", "TextEdit"]),
    ]
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn default_apps() -> Vec<AppShortcut> {
    vec![
        app("open calculator", "Calculator", "gnome-calculator", &[]),
        app("open notepad", "Notepad", "gedit", &[]),
    ]
}
