//! HTTP tool gateway
//!
//! Every tool is reached through a single endpoint:
//!
//! ```text
//! POST {endpoint}
//! {"name": "loki_query", "args": {"query": "..."}}
//! ```
//!
//! A 2xx reply body becomes the tool output verbatim.

use async_trait::async_trait;
use council_application::{ToolError, ToolGateway, ToolOutput};
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Maximum tool output kept for the prompt
const MAX_OUTPUT_CHARS: usize = 20_000;

#[derive(Debug, Clone)]
pub struct HttpToolGateway {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct ToolRequest<'a> {
    name: &'a str,
    args: &'a serde_json::Value,
}

impl HttpToolGateway {
    pub fn new(endpoint: impl Into<String>, request_timeout: Duration) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("signal-council/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ToolError::failed("*", format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn classify_status(tool: &str, status: StatusCode, body: &str) -> ToolError {
    if status == StatusCode::NOT_FOUND {
        return ToolError::NotFound(tool.to_string());
    }
    if status == StatusCode::GATEWAY_TIMEOUT || status == StatusCode::REQUEST_TIMEOUT {
        return ToolError::Timeout(tool.to_string());
    }
    ToolError::failed(
        tool,
        format!(
            "HTTP {}: {}",
            status.as_u16(),
            body.chars().take(200).collect::<String>()
        ),
    )
}

fn truncate_output(mut content: String) -> String {
    if let Some((idx, _)) = content.char_indices().nth(MAX_OUTPUT_CHARS) {
        content.truncate(idx);
        content.push_str("\n... [truncated]");
    }
    content
}

#[async_trait]
impl ToolGateway for HttpToolGateway {
    async fn call_tool(
        &self,
        name: &str,
        args: &serde_json::Value,
    ) -> Result<ToolOutput, ToolError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ToolRequest { name, args })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ToolError::Timeout(name.to_string())
                } else {
                    ToolError::failed(name, e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ToolError::failed(name, format!("failed to read body: {}", e)))?;

        if !status.is_success() {
            return Err(classify_status(name, status, &body));
        }

        debug!("Tool {} returned {} bytes", name, body.len());
        Ok(ToolOutput::new(name, truncate_output(body)))
    }
}

/// Gateway used when no tool endpoint is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledToolGateway;

#[async_trait]
impl ToolGateway for DisabledToolGateway {
    async fn call_tool(
        &self,
        name: &str,
        _args: &serde_json::Value,
    ) -> Result<ToolOutput, ToolError> {
        Err(ToolError::failed(name, "no tool endpoint configured"))
    }
}
