//! Reasoning engine port
//!
//! Defines the interface for the model call that interprets telemetry,
//! cross-examines findings, and synthesizes the overall assessment.
//! Prompt construction lives in the domain; model invocation lives in
//! infrastructure adapters.

use async_trait::async_trait;
use council_domain::SignalDomain;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by a reasoning-engine call.
///
/// `Transient` errors are retried once by the caller; `Fatal` errors are not.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Transient engine error: {0}")]
    Transient(String),

    #[error("Fatal engine error: {0}")]
    Fatal(String),
}

impl EngineError {
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::Transient(_))
    }
}

/// Which council role a prompt is issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "role", content = "domain")]
pub enum PromptPurpose {
    Worker(SignalDomain),
    Critic,
    Synthesis,
}

impl PromptPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptPurpose::Worker(_) => "worker",
            PromptPurpose::Critic => "critic",
            PromptPurpose::Synthesis => "synthesis",
        }
    }
}

/// Everything the engine needs for one call
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub purpose: PromptPurpose,
    pub investigation_id: String,
    pub round: usize,
    pub system: String,
    pub user: String,
}

impl PromptContext {
    pub fn new(
        purpose: PromptPurpose,
        investigation_id: impl Into<String>,
        round: usize,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            purpose,
            investigation_id: investigation_id.into(),
            round,
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Token accounting reported by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Engine reply: structured JSON or free text, plus usage
#[derive(Debug, Clone, PartialEq)]
pub struct EngineResponse {
    pub text: String,
    pub usage: TokenUsage,
}

impl EngineResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: TokenUsage::default(),
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }
}

/// Port for reasoning-engine calls
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    async fn invoke(&self, prompt: &PromptContext) -> Result<EngineResponse, EngineError>;
}
