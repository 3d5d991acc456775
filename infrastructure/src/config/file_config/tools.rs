//! Tool gateway configuration from TOML (`[tools]` section)
//!
//! Every worker's telemetry tools are reached through one HTTP endpoint,
//! guarded by a per-tool circuit breaker.
//!
//! ```toml
//! [tools]
//! endpoint = "http://localhost:8700/tools/call"
//! request_timeout_secs = 20
//! failure_threshold = 3
//! cooldown_secs = 30
//! ```

use council_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolsConfig {
    /// Tool endpoint; no tools are called when unset
    pub endpoint: Option<String>,
    pub request_timeout_secs: u64,
    /// Consecutive failures that open a tool's circuit
    pub failure_threshold: u32,
    /// Seconds an open circuit waits before letting one probe through
    pub cooldown_secs: u64,
}

impl Default for FileToolsConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            request_timeout_secs: 20,
            failure_threshold: 3,
            cooldown_secs: 30,
        }
    }
}

impl FileToolsConfig {
    pub fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.request_timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout {
                    field: "tools.request_timeout_secs".to_string(),
                },
                "tools.request_timeout_secs cannot be 0",
            ));
        }
        if self.failure_threshold == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "tools.failure_threshold".to_string(),
                },
                "tools.failure_threshold must be at least 1",
            ));
        }
        issues
    }
}
