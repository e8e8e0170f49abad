//! Text-to-speech through the platform's built-in synthesizer.
//!
//! Windows uses System.Speech via PowerShell, macOS uses `say`, and other
//! systems use espeak-ng or espeak when one is on the PATH. Playback blocks
//! until the utterance is finished, then holds a short settle pause so the
//! microphone does not pick up the tail of the assistant's own voice.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use neon_core::config::SpeechConfig;
use neon_core::speech::Speaker;

/// SAPI speaks at roughly this many words per minute at `Rate = 0`.
const SAPI_BASE_WPM: f32 = 180.0;
/// Words per minute per SAPI rate step.
const SAPI_WPM_PER_STEP: f32 = 18.0;
/// Loudest espeak amplitude; 100 is its normal level.
const ESPEAK_MAX_AMPLITUDE: f32 = 200.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TtsEngine {
    /// System.Speech through `powershell -Command`.
    PowerShell,
    /// macOS `say`.
    Say,
    /// espeak or espeak-ng at the given path.
    Espeak(PathBuf),
    /// No engine found; utterances are only logged.
    Silent,
}

impl TtsEngine {
    /// Pick the engine for this platform.
    pub fn detect() -> Self {
        if cfg!(target_os = "windows") {
            return TtsEngine::PowerShell;
        }
        if cfg!(target_os = "macos") {
            return TtsEngine::Say;
        }
        match which::which("espeak-ng").or_else(|_| which::which("espeak")) {
            Ok(path) => TtsEngine::Espeak(path),
            Err(_) => {
                tracing::warn!("No espeak or espeak-ng found; speech output disabled");
                TtsEngine::Silent
            }
        }
    }

    /// Installed voice names, in the order the engine reports them.
    pub fn voices(&self) -> Vec<String> {
        let output = match self {
            TtsEngine::PowerShell => Command::new("powershell")
                .args(["-NoProfile", "-Command", LIST_SAPI_VOICES])
                .output(),
            TtsEngine::Say => Command::new("say").args(["-v", "?"]).output(),
            TtsEngine::Espeak(path) => Command::new(path).arg("--voices").output(),
            TtsEngine::Silent => return Vec::new(),
        };
        let stdout = match output {
            Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout).into_owned(),
            Ok(out) => {
                tracing::debug!(status = %out.status, "Voice listing failed");
                return Vec::new();
            }
            Err(e) => {
                tracing::debug!(error = %e, "Voice listing failed");
                return Vec::new();
            }
        };
        match self {
            TtsEngine::PowerShell => parse_line_voices(&stdout),
            TtsEngine::Say => parse_say_voices(&stdout),
            TtsEngine::Espeak(_) => parse_espeak_voices(&stdout),
            TtsEngine::Silent => Vec::new(),
        }
    }
}

const LIST_SAPI_VOICES: &str = "Add-Type -AssemblyName System.Speech; \
(New-Object System.Speech.Synthesis.SpeechSynthesizer).GetInstalledVoices() | \
ForEach-Object { $_.VoiceInfo.Name }";

/// [`Speaker`] backed by the system synthesizer.
#[derive(Debug, Clone)]
pub struct SystemSpeaker {
    engine: TtsEngine,
    voice: Option<String>,
    rate_wpm: u32,
    volume: f32,
    settle: Duration,
}

impl SystemSpeaker {
    /// Detect the engine and resolve the voice. An explicit voice in the
    /// config wins; otherwise the second installed voice is used when
    /// `prefer_alternate_voice` is set and one exists.
    pub fn new(config: &SpeechConfig) -> Self {
        let engine = TtsEngine::detect();
        let voice = config.voice.clone().or_else(|| {
            config
                .prefer_alternate_voice
                .then(|| alternate_voice(&engine.voices()))
                .flatten()
        });
        tracing::info!(engine = ?engine, voice = ?voice, "Speech output ready");
        Self::with_engine(engine, voice, config)
    }

    pub fn with_engine(engine: TtsEngine, voice: Option<String>, config: &SpeechConfig) -> Self {
        Self {
            engine,
            voice,
            rate_wpm: config.rate_wpm,
            volume: config.volume.clamp(0.0, 1.0),
            settle: Duration::from_millis(config.settle_ms),
        }
    }

    pub fn engine(&self) -> &TtsEngine {
        &self.engine
    }

    pub fn voice(&self) -> Option<&str> {
        self.voice.as_deref()
    }

    fn command(&self, text: &str) -> Option<Command> {
        match &self.engine {
            TtsEngine::PowerShell => {
                let script =
                    powershell_script(text, self.voice.as_deref(), self.rate_wpm, self.volume);
                let mut cmd = Command::new("powershell");
                cmd.args(["-NoProfile", "-Command", script.as_str()]);
                Some(cmd)
            }
            TtsEngine::Say => {
                let mut cmd = Command::new("say");
                if let Some(voice) = &self.voice {
                    cmd.args(["-v", voice.as_str()]);
                }
                let rate = self.rate_wpm.to_string();
                cmd.args(["-r", rate.as_str(), "--", text]);
                Some(cmd)
            }
            TtsEngine::Espeak(path) => {
                let rate = self.rate_wpm.to_string();
                let amplitude = espeak_amplitude(self.volume).to_string();
                let mut cmd = Command::new(path);
                cmd.args(["-s", rate.as_str(), "-a", amplitude.as_str()]);
                if let Some(voice) = &self.voice {
                    cmd.args(["-v", voice.as_str()]);
                }
                cmd.arg(text);
                Some(cmd)
            }
            TtsEngine::Silent => None,
        }
    }
}

impl Speaker for SystemSpeaker {
    fn speak(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        tracing::info!(text, "Speaking");

        if let Some(mut cmd) = self.command(text) {
            let status = cmd
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
            match status {
                Ok(s) if s.success() => {}
                Ok(s) => tracing::warn!(status = %s, engine = ?self.engine, "Speech engine failed"),
                Err(e) => tracing::warn!(error = %e, engine = ?self.engine, "Speech engine failed"),
            }
        }

        if !self.settle.is_zero() {
            std::thread::sleep(self.settle);
        }
    }
}

/// Second reported voice, if there is one.
fn alternate_voice(voices: &[String]) -> Option<String> {
    voices.get(1).cloned()
}

/// Map words per minute onto SAPI's -10..=10 rate scale.
fn sapi_rate(wpm: u32) -> i32 {
    let steps = (wpm as f32 - SAPI_BASE_WPM) / SAPI_WPM_PER_STEP;
    (steps.round() as i32).clamp(-10, 10)
}

/// Map volume onto espeak's full 0..=200 amplitude range, so 1.0 is the
/// loudest setting like SAPI's 100.
fn espeak_amplitude(volume: f32) -> u32 {
    (volume.clamp(0.0, 1.0) * ESPEAK_MAX_AMPLITUDE).round() as u32
}

/// PowerShell single-quoted strings escape `'` by doubling it.
fn ps_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn powershell_script(text: &str, voice: Option<&str>, rate_wpm: u32, volume: f32) -> String {
    let mut script = format!(
        "Add-Type -AssemblyName System.Speech; \
         $speak = New-Object System.Speech.Synthesis.SpeechSynthesizer; \
         $speak.Rate = {}; $speak.Volume = {}; ",
        sapi_rate(rate_wpm),
        (volume.clamp(0.0, 1.0) * 100.0).round() as u32
    );
    if let Some(voice) = voice {
        script.push_str(&format!("$speak.SelectVoice({}); ", ps_quote(voice)));
    }
    script.push_str(&format!("$speak.Speak({})", ps_quote(text)));
    script
}

fn parse_line_voices(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// `say -v ?` lines look like `Samantha    en_US    # Hello, my name is...`.
fn parse_say_voices(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let head = line.split('#').next()?.trim();
            let (name, _locale) = head.rsplit_once(char::is_whitespace)?;
            let name = name.trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

/// `espeak --voices` prints a header then
/// `Pty Language Age/Gender VoiceName File Other`. The file column is what
/// `-v` accepts.
fn parse_espeak_voices(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().nth(4).map(str::to_string))
        .collect()
}
