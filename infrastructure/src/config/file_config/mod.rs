//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to domain/application types
//! through `to_*` / `parse_*` helpers that report [`ConfigIssue`]s instead of
//! failing.

mod council;
mod engine;
mod intent;
mod telemetry;
mod tools;
mod workers;

pub use council::FileCouncilConfig;
pub use engine::FileEngineConfig;
pub use intent::FileIntentConfig;
pub use telemetry::FileTelemetryConfig;
pub use tools::FileToolsConfig;
pub use workers::{FileToolEntry, FileWorkerConfig};

use council_domain::{ConfigIssue, ConfigIssueCode, SignalDomain};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Raised when validation finds at least one error-severity issue
#[derive(Debug, Error)]
#[error("invalid configuration: {}", join_messages(.0))]
pub struct ConfigValidationError(pub Vec<ConfigIssue>);

fn join_messages(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Debate loop control
    pub council: FileCouncilConfig,
    /// Intent classifier rules
    pub intent: FileIntentConfig,
    /// Reasoning engine endpoint
    pub engine: FileEngineConfig,
    /// Tool endpoint and circuit breaker
    pub tools: FileToolsConfig,
    /// Specialist workers
    pub workers: Vec<FileWorkerConfig>,
    /// JSONL event feed
    pub telemetry: FileTelemetryConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. Council ranges and timeouts
    /// 2. Intent rules (unknown domains)
    /// 3. Engine and tool timeouts
    /// 4. Worker domains, duplicate ids, and empty tool names
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.council.issues());
        issues.extend(self.intent.to_rules().1);
        issues.extend(self.engine.issues());
        issues.extend(self.tools.issues());

        let mut seen = BTreeSet::new();
        for worker in &self.workers {
            if let Err(issue) = worker.parse_domain() {
                issues.push(issue);
            }

            let id = worker.worker_id();
            if !seen.insert(id.clone()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateWorker { id: id.clone() },
                    format!("workers: id '{}' is used more than once", id),
                ));
            }

            if worker.tools.iter().any(|t| t.name().trim().is_empty()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyToolName { worker: id.clone() },
                    format!("workers.{}: tool name cannot be empty", id),
                ));
            }
        }

        issues
    }

    /// Validate and split: errors fail, warnings are returned for display.
    pub fn check(&self) -> Result<Vec<ConfigIssue>, ConfigValidationError> {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            self.validate().into_iter().partition(ConfigIssue::is_error);
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(ConfigValidationError(errors))
        }
    }

    /// Configured workers, or one tool-less worker per signal domain.
    pub fn effective_workers(&self) -> Vec<FileWorkerConfig> {
        if self.workers.is_empty() {
            SignalDomain::ALL
                .iter()
                .map(|d| FileWorkerConfig::for_domain(*d))
                .collect()
        } else {
            self.workers.clone()
        }
    }
}
