//! OpenAI-compatible chat completions adapter.
//!
//! Error mapping:
//!
//! | Failure | EngineError |
//! |---------|-------------|
//! | HTTP 429, HTTP 5xx | `Transient` |
//! | connect error, request timeout | `Transient` |
//! | other HTTP status, bad body, no choices | `Fatal` |

use crate::config::FileEngineConfig;
use async_trait::async_trait;
use council_application::{EngineError, EngineResponse, PromptContext, ReasoningEngine, TokenUsage};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub struct HttpReasoningEngine {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: f64,
}

impl HttpReasoningEngine {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("signal-council/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EngineError::Fatal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: None,
            temperature: 0.2,
        })
    }

    /// Build from the `[engine]` section, reading the API key from the
    /// configured environment variable.
    pub fn from_config(config: &FileEngineConfig) -> Result<Self, EngineError> {
        let engine = Self::new(
            config.endpoint.clone(),
            config.model.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?
        .with_temperature(config.temperature);

        Ok(match config.api_key() {
            Some(key) => engine.with_api_key(key),
            None => engine,
        })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body<'a>(&'a self, prompt: &'a PromptContext) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

fn classify_status(status: StatusCode, body: &str) -> EngineError {
    let message = format!(
        "HTTP {} {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown"),
        body.chars().take(200).collect::<String>()
    );
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        EngineError::Transient(message)
    } else {
        EngineError::Fatal(message)
    }
}

fn classify_transport(error: &reqwest::Error) -> EngineError {
    if error.is_timeout() || error.is_connect() {
        EngineError::Transient(error.to_string())
    } else {
        EngineError::Fatal(error.to_string())
    }
}

fn parse_response(body: &str) -> Result<EngineResponse, EngineError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| EngineError::Fatal(format!("invalid completion body: {}", e)))?;

    let text = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| EngineError::Fatal("completion has no content".to_string()))?;

    let usage = parsed.usage.map_or_else(TokenUsage::default, |u| TokenUsage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
    });

    Ok(EngineResponse::new(text).with_usage(usage))
}

#[async_trait]
impl ReasoningEngine for HttpReasoningEngine {
    async fn invoke(&self, prompt: &PromptContext) -> Result<EngineResponse, EngineError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&self.request_body(prompt));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| classify_transport(&e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| classify_transport(&e))?;

        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        let response = parse_response(&body)?;
        debug!(
            "Engine {} ({} round {}): {} tokens",
            self.model,
            prompt.purpose.as_str(),
            prompt.round,
            response.usage.total()
        );
        Ok(response)
    }
}
