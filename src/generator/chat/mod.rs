
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::Prompt;
use crate::config::{ConfigError, Endpoint};
use crate::{RagError, Result};

const COMPLETIONS_PATH: &str = "v1/chat/completions";

/// Blocking client for an OpenAI-compatible chat-completions endpoint
///
/// Each call is a single attempt; retries are left to the caller.
#[derive(Debug, Clone)]
pub struct ChatClient {
    url: Url,
    token: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatClient {
    #[inline]
    pub fn new(endpoint: &Endpoint) -> Result<Self> {
        let url = completions_url(&endpoint.base_url)?;

        // Non-2xx statuses are returned as responses so their body can be reported
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(endpoint.timeout_secs)))
            .http_status_as_error(false)
            .build()
            .into();

        Ok(Self {
            url,
            token: endpoint.token.clone(),
            model: endpoint.model.clone(),
            temperature: endpoint.temperature,
            max_tokens: endpoint.max_tokens,
            agent,
        })
    }

    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send the prompt and return the first choice's content
    #[inline]
    pub fn generate(&self, prompt: &Prompt) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                Message {
                    role: "system",
                    content: &prompt.system,
                },
                Message {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| RagError::UpstreamUnavailable(format!("failed to encode request: {e}")))?;

        info!("Requesting completion from {} (model {})", self.url, self.model);

        let mut response = self
            .agent
            .post(self.url.as_str())
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", "application/json")
            .send(&request_json)
            .map_err(|e| {
                warn!("Completion request failed: {}", e);
                RagError::UpstreamUnavailable(e.to_string())
            })?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| RagError::UpstreamUnavailable(format!("failed to read response: {e}")))?;

        if !(200..300).contains(&status) {
            warn!("Completion endpoint returned HTTP {}", status);
            return Err(RagError::UpstreamError { status, body });
        }

        debug!("Completion response: {} bytes", body.len());
        extract_answer(&body)
    }
}

fn completions_url(base_url: &Url) -> Result<Url> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(COMPLETIONS_PATH)
        .map_err(|_| ConfigError::InvalidUrl(base.to_string()).into())
}

fn extract_answer(body: &str) -> Result<String> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| RagError::UpstreamMalformed(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| RagError::UpstreamMalformed("response contained no choices".to_string()))?
        .message
        .content
        .ok_or_else(|| RagError::UpstreamMalformed("first choice has no content".to_string()))
}
