//! Reasoning engine configuration from TOML (`[engine]` section)
//!
//! ```toml
//! [engine]
//! endpoint = "https://api.openai.com/v1/chat/completions"
//! model = "gpt-4o-mini"
//! api_key_env = "OPENAI_API_KEY"
//! request_timeout_secs = 60
//! temperature = 0.2
//! ```

use council_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    /// OpenAI-compatible chat completions URL
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub request_timeout_secs: u64,
    pub temperature: f64,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            request_timeout_secs: 60,
            temperature: 0.2,
        }
    }
}

impl FileEngineConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.request_timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout {
                    field: "engine.request_timeout_secs".to_string(),
                },
                "engine.request_timeout_secs cannot be 0",
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "engine.temperature".to_string(),
                },
                format!(
                    "engine.temperature = {} is outside 0.0..=2.0 and may be rejected",
                    self.temperature
                ),
            ));
        }
        issues
    }
}
