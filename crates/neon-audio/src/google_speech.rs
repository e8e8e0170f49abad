//! Google Cloud Speech-to-Text `speech:recognize` client.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use neon_core::config::RecognizerConfig;
use neon_core::error::{NeonError, Result};

use crate::samples_to_pcm16;

pub struct GoogleSpeechClient {
    agent: ureq::Agent,
    endpoint: String,
    language: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl GoogleSpeechClient {
    pub fn new(config: &RecognizerConfig, api_key: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self {
            agent,
            endpoint: config.endpoint.clone(),
            language: config.language.clone(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_key_env: config.api_key_env.clone(),
        }
    }

    pub fn from_env(config: &RecognizerConfig) -> Self {
        let key = std::env::var(&config.api_key_env).ok();
        Self::new(config, key)
    }

    /// Fails with a configuration error when no key is set, so the missing
    /// key surfaces at startup rather than on the first wake attempt.
    pub fn ensure_api_key(&self) -> Result<()> {
        match self.api_key {
            Some(_) => Ok(()),
            None => Err(self.missing_key()),
        }
    }

    fn missing_key(&self) -> NeonError {
        NeonError::Config(format!(
            "speech recognition key not set; export {}",
            self.api_key_env
        ))
    }

    /// Transcribe mono samples. `Ok(None)` means the service heard nothing
    /// it could transcribe.
    pub fn transcribe(&self, samples: &[f32], sample_rate: u32) -> Result<Option<String>> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(self.missing_key());
        };

        let body = serde_json::to_string(&build_request(samples, sample_rate, &self.language))?;
        tracing::debug!(
            samples = samples.len(),
            sample_rate,
            language = %self.language,
            "Sending recognition request"
        );

        let response = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .set("x-goog-api-key", key)
            .send_string(&body);

        let text = match response {
            Ok(resp) => resp
                .into_string()
                .map_err(|e| NeonError::Recognition(e.to_string()))?,
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                return Err(NeonError::Recognition(format!("HTTP {status}: {body}")));
            }
            Err(e) => return Err(NeonError::Recognition(e.to_string())),
        };

        parse_transcript(&text)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    encoding: &'static str,
    sample_rate_hertz: u32,
    language_code: &'a str,
}

#[derive(Debug, Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Debug, Serialize)]
struct RecognizeRequest<'a> {
    config: RecognitionConfig<'a>,
    audio: RecognitionAudio,
}

fn build_request<'a>(samples: &[f32], sample_rate: u32, language: &'a str) -> RecognizeRequest<'a> {
    RecognizeRequest {
        config: RecognitionConfig {
            encoding: "LINEAR16",
            sample_rate_hertz: sample_rate,
            language_code: language,
        },
        audio: RecognitionAudio {
            content: STANDARD.encode(samples_to_pcm16(samples)),
        },
    }
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
}

/// Join the top alternative of each result.
fn parse_transcript(body: &str) -> Result<Option<String>> {
    let response: RecognizeResponse = serde_json::from_str(body)
        .map_err(|e| NeonError::Recognition(format!("malformed response: {e}")))?;
    let transcript = response
        .results
        .iter()
        .filter_map(|r| r.alternatives.first())
        .map(|a| a.transcript.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Ok((!transcript.is_empty()).then_some(transcript))
}
