//! Investigation mode and signal domain definitions.
//!
//! [`InvestigationMode`] is chosen once per query by the intent classifier and
//! controls how many workers are dispatched and whether the debate loop runs:
//!
//! | Mode     | Workers dispatched        | Debate loop |
//! |----------|---------------------------|-------------|
//! | Fast     | one, matching the signal  | no          |
//! | Standard | all configured            | no          |
//! | Debate   | all configured            | yes         |

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How deep an investigation goes. Immutable once selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestigationMode {
    /// One worker, one pass. For quick health checks.
    Fast,
    /// Every worker, one pass.
    #[default]
    Standard,
    /// Every worker, then critique and re-analysis until confident.
    Debate,
}

impl InvestigationMode {
    /// Whether the debate loop may run after round 0
    pub fn is_debate(&self) -> bool {
        matches!(self, InvestigationMode::Debate)
    }

    /// Whether only the primary signal's worker is dispatched
    pub fn is_single_worker(&self) -> bool {
        matches!(self, InvestigationMode::Fast)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvestigationMode::Fast => "fast",
            InvestigationMode::Standard => "standard",
            InvestigationMode::Debate => "debate",
        }
    }

    /// Get a human-readable description of this mode
    pub fn description(&self) -> &'static str {
        match self {
            InvestigationMode::Fast => "Fast: single specialist, single pass",
            InvestigationMode::Standard => "Standard: all specialists, single pass",
            InvestigationMode::Debate => "Debate: all specialists with critique rounds",
        }
    }
}

impl fmt::Display for InvestigationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for InvestigationMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fast" | "f" => Ok(InvestigationMode::Fast),
            "standard" | "std" | "s" => Ok(InvestigationMode::Standard),
            "debate" | "d" => Ok(InvestigationMode::Debate),
            other => Err(DomainError::UnknownMode(other.to_string())),
        }
    }
}

/// An observability signal domain a specialist worker covers.
///
/// Declaration order doubles as the tie-break priority when the intent
/// classifier scores two domains equally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalDomain {
    Alerts,
    Metrics,
    Logs,
    Traces,
    Sql,
}

impl SignalDomain {
    pub const ALL: [SignalDomain; 5] = [
        SignalDomain::Alerts,
        SignalDomain::Metrics,
        SignalDomain::Logs,
        SignalDomain::Traces,
        SignalDomain::Sql,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalDomain::Alerts => "alerts",
            SignalDomain::Metrics => "metrics",
            SignalDomain::Logs => "logs",
            SignalDomain::Traces => "traces",
            SignalDomain::Sql => "sql",
        }
    }

    /// Display name used in prompts and console output
    pub fn display_name(&self) -> &'static str {
        match self {
            SignalDomain::Alerts => "Alerting",
            SignalDomain::Metrics => "Metrics",
            SignalDomain::Logs => "Logs",
            SignalDomain::Traces => "Distributed Tracing",
            SignalDomain::Sql => "Database / SQL",
        }
    }
}

impl fmt::Display for SignalDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SignalDomain {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alerts" | "alert" | "alerting" => Ok(SignalDomain::Alerts),
            "metrics" | "metric" => Ok(SignalDomain::Metrics),
            "logs" | "log" | "logging" => Ok(SignalDomain::Logs),
            "traces" | "trace" | "tracing" => Ok(SignalDomain::Traces),
            "sql" | "database" | "db" => Ok(SignalDomain::Sql),
            other => Err(DomainError::UnknownSignalDomain(other.to_string())),
        }
    }
}
