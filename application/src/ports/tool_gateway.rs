//! Tool gateway port
//!
//! Defines how specialist workers fetch telemetry (trace, log, metric,
//! alert, and SQL clients). Adapters are expected to sit behind a circuit
//! breaker; an open circuit surfaces as [`ToolError::CircuitOpen`] and is
//! handled exactly like any other tool failure.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Circuit open for tool {0}")]
    CircuitOpen(String),

    #[error("Tool {0} not found")]
    NotFound(String),

    #[error("Tool {0} timed out")]
    Timeout(String),

    #[error("Tool {tool} failed: {message}")]
    Failed { tool: String, message: String },
}

impl ToolError {
    pub fn failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        ToolError::Failed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn is_circuit_open(&self) -> bool {
        matches!(self, ToolError::CircuitOpen(_))
    }
}

/// Output of a successful tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub tool: String,
    pub content: String,
}

impl ToolOutput {
    pub fn new(tool: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            content: content.into(),
        }
    }
}

/// Port for telemetry tool calls
#[async_trait]
pub trait ToolGateway: Send + Sync {
    async fn call_tool(&self, name: &str, args: &serde_json::Value)
    -> Result<ToolOutput, ToolError>;
}
