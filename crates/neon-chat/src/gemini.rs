//! Gemini `generateContent` client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use neon_core::config::AiConfig;

use crate::error::ChatError;
use crate::fallback::ReplyGenerator;

/// Instruction sent with every request.
pub const PERSONA: &str = "You are a helpful, friendly, and concise AI assistant. \
You are speaking to the user through voice. Keep your responses brief and conversational. \
Do NOT use asterisks, markdown formatting, or special characters in your response. \
Speak naturally as if having a voice conversation.";

/// Blocking client for the Gemini REST API.
pub struct GeminiClient {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl GeminiClient {
    pub fn new(config: &AiConfig, api_key: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self {
            agent,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_key_env: config.api_key_env.clone(),
        }
    }

    /// Build a client whose key is read from the configured environment
    /// variable.
    pub fn from_env(config: &AiConfig) -> Self {
        let key = std::env::var(&config.api_key_env).ok();
        Self::new(config, key)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }
}

impl ReplyGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, ChatError> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(ChatError::MissingApiKey(self.api_key_env.clone()));
        };

        let body = serde_json::to_string(&build_request(prompt))?;
        debug!(model = %self.model, "Sending generative fallback request");

        let response = self
            .agent
            .post(&self.url())
            .set("Content-Type", "application/json")
            .set("x-goog-api-key", key)
            .send_string(&body);

        let text = match response {
            Ok(resp) => resp
                .into_string()
                .map_err(|e| ChatError::Transport(e.to_string()))?,
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                return Err(ChatError::Status { status, body });
            }
            Err(e) => return Err(ChatError::Transport(e.to_string())),
        };

        parse_reply(&text)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

fn build_request(prompt: &str) -> GenerateRequest<'_> {
    GenerateRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part { text: PERSONA }],
        },
        contents: vec![Content {
            role: Some("user"),
            parts: vec![Part { text: prompt }],
        }],
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Concatenate the text parts of the first candidate.
fn parse_reply(body: &str) -> Result<String, ChatError> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ChatError::EmptyReply);
    }
    Ok(text)
}
