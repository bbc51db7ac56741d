//! Chat-completions HTTP client.
//!
//! This module provides a small blocking client for an OpenAI-compatible
//! `/chat/completions` endpoint. Every attempt is bounded by the configured
//! timeout, and transient failures (unreachable host, HTTP 429, HTTP 5xx) are
//! retried a bounded number of times with a linear backoff.

use super::prompts::{emoji_prompt, extract_suffix};
use super::TextAugmenter;
use crate::config::AiConfig;
use crate::constants::AI_RETRY_BACKOFF_MS;
use crate::errors::{AIError, AppError, AppResult};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// A message in a chat conversation.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// The role of the message sender (user, assistant)
    pub role: String,
    /// The content of the message
    pub content: String,
}

impl Message {
    /// Creates a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for chat completion.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
}

/// Response from chat completion.
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

/// Client for a chat-completions API.
pub struct ChatClient {
    base_url: String,
    api_key: Zeroizing<String>,
    model: String,
    temperature: f32,
    max_retries: u32,
    backoff: Duration,
    client: Client,
}

impl ChatClient {
    /// Creates a new client from validated configuration.
    ///
    /// Must not be called from inside an async context: the blocking reqwest
    /// client spins up its own runtime.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the underlying HTTP client cannot be built.
    pub fn new(config: &AiConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
            backoff: Duration::from_millis(AI_RETRY_BACKOFF_MS),
            client,
        })
    }

    /// Overrides the delay between retries.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sends a chat completion request and returns the first choice's text.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The API is not reachable within the timeout on every attempt
    /// - The API rate limits every attempt
    /// - The API returns a non-success status
    /// - The response body is not a completion with content
    pub fn chat(&self, messages: &[Message]) -> AppResult<String> {
        let total_attempts = self.max_retries + 1;
        let mut attempt = 1;

        loop {
            match self.send_once(messages) {
                Ok(content) => return Ok(content),
                Err(err) if err.is_transient() && attempt < total_attempts => {
                    warn!(
                        "Augmentation attempt {}/{} failed: {}; retrying",
                        attempt, total_attempts, err
                    );
                    thread::sleep(self.backoff * attempt);
                    attempt += 1;
                }
                Err(AIError::RateLimited { .. }) => {
                    return Err(AIError::RateLimited { attempts: attempt }.into())
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn send_once(&self, messages: &[Message]) -> Result<String, AIError> {
        debug!("Sending chat request with model: {}", self.model);

        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        let mut builder = self.client.post(&url).json(&request);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(self.api_key.as_str());
        }

        let response = builder.send().map_err(AIError::Unreachable)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AIError::RateLimited { attempts: 1 });
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AIError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // A timeout or reset while reading the body is a transport failure.
        let chat_response: ChatResponse = response.json().map_err(|e| {
            if e.is_timeout() || e.is_body() {
                AIError::Unreachable(e)
            } else {
                AIError::InvalidResponse(format!("Failed to parse chat response: {}", e))
            }
        })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AIError::InvalidResponse("response had no choices".to_string()))?;

        debug!("Received chat response");
        Ok(content)
    }
}

impl TextAugmenter for ChatClient {
    fn suggest_emoji(&self, text: &str) -> AppResult<String> {
        let reply = self.chat(&emoji_prompt(text))?;
        Ok(extract_suffix(&reply)?)
    }
}
