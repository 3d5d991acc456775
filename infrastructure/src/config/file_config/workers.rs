//! Worker configuration from TOML (`[[workers]]` array)
//!
//! ```toml
//! [[workers]]
//! domain = "logs"
//! tools = ["loki_query"]
//!
//! [[workers]]
//! id = "metrics-eu"
//! domain = "metrics"
//! tools = [
//!     "slo_status",
//!     { name = "promql", args = { query = "rate(http_requests_total{status=~\"5..\"}[5m])" } },
//! ]
//! ```
//!
//! When no `[[workers]]` are configured, one tool-less worker per signal
//! domain is used.

use council_application::ToolBinding;
use council_domain::{ConfigIssue, ConfigIssueCode, SignalDomain};
use serde::{Deserialize, Serialize};

/// A tool given either by name or with arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileToolEntry {
    Name(String),
    Binding(ToolBinding),
}

impl FileToolEntry {
    pub fn name(&self) -> &str {
        match self {
            FileToolEntry::Name(name) => name,
            FileToolEntry::Binding(binding) => &binding.name,
        }
    }

    pub fn to_binding(&self) -> ToolBinding {
        match self {
            FileToolEntry::Name(name) => ToolBinding::new(name.clone()),
            FileToolEntry::Binding(binding) => binding.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileWorkerConfig {
    pub domain: String,
    /// Defaults to the domain name
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub tools: Vec<FileToolEntry>,
}

impl FileWorkerConfig {
    pub fn for_domain(domain: SignalDomain) -> Self {
        Self {
            domain: domain.as_str().to_string(),
            id: None,
            tools: Vec::new(),
        }
    }

    pub fn worker_id(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| self.domain.trim().to_lowercase())
    }

    pub fn parse_domain(&self) -> Result<SignalDomain, ConfigIssue> {
        self.domain.parse::<SignalDomain>().map_err(|_| {
            ConfigIssue::error(
                ConfigIssueCode::InvalidEnumValue {
                    field: "workers.domain".to_string(),
                    value: self.domain.clone(),
                    valid_values: SignalDomain::ALL
                        .iter()
                        .map(|d| d.as_str().to_string())
                        .collect(),
                },
                format!("workers: unknown signal domain '{}'", self.domain),
            )
        })
    }

    pub fn tool_bindings(&self) -> Vec<ToolBinding> {
        self.tools.iter().map(FileToolEntry::to_binding).collect()
    }
}
