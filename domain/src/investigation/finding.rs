//! Findings produced by specialist workers.
//!
//! A [`Finding`] is owned by the worker that produced it until it is
//! published into a round's result set, after which it is read-only.
//! When a worker fails, a degraded placeholder takes its slot so every
//! dispatched worker always has exactly one entry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a dispatched worker. Used as the deterministic map key for
/// findings and as the reference target in critic reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(String);

impl WorkerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for WorkerId {
    fn from(s: &str) -> Self {
        WorkerId::new(s)
    }
}

/// Severity of a finding or of the overall assessment.
///
/// Ordering is `Healthy < Info < Warning < Critical`, so `max()` yields the
/// most severe value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Healthy,
    #[default]
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Healthy => "healthy",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "healthy" | "ok" | "normal" => Ok(Severity::Healthy),
            "info" | "informational" => Ok(Severity::Info),
            "warning" | "warn" | "degraded" => Ok(Severity::Warning),
            "critical" | "crit" | "error" => Ok(Severity::Critical),
            other => Err(format!("Unknown severity: {}", other)),
        }
    }
}

/// A structured per-domain assessment from one specialist worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub summary: String,
    pub severity: Severity,
    /// Worker's own confidence, always within 0.0..=1.0
    pub confidence: f64,
    /// Short text/data references, in the order the worker reported them
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default)]
    pub recommended_actions: Vec<String>,
    /// True when this is a placeholder substituted for a failed worker
    #[serde(default)]
    pub degraded: bool,
}

impl Finding {
    pub fn new(summary: impl Into<String>, severity: Severity, confidence: f64) -> Self {
        Self {
            summary: summary.into(),
            severity,
            confidence: clamp_confidence(confidence),
            evidence: Vec::new(),
            recommended_actions: Vec::new(),
            degraded: false,
        }
    }

    /// Placeholder for a worker that failed, timed out, or was cancelled.
    ///
    /// Always `severity=Info`, `confidence=0.0`, with one evidence entry
    /// describing the failure.
    pub fn degraded(worker: &WorkerId, reason: impl fmt::Display) -> Self {
        Self {
            summary: format!("Worker {} produced no usable finding", worker),
            severity: Severity::Info,
            confidence: 0.0,
            evidence: vec![format!("worker failure: {}", reason)],
            recommended_actions: Vec::new(),
            degraded: true,
        }
    }

    pub fn with_evidence(mut self, item: impl Into<String>) -> Self {
        self.evidence.push(item.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.recommended_actions.push(action.into());
        self
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

/// Clamp a confidence value into `0.0..=1.0`, mapping NaN to 0.0.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert!(Severity::Info > Severity::Healthy);
        let max = [Severity::Info, Severity::Critical, Severity::Healthy]
            .into_iter()
            .max();
        assert_eq!(max, Some(Severity::Critical));
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!("CRITICAL".parse::<Severity>(), Ok(Severity::Critical));
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert!("panic".parse::<Severity>().is_err());
    }

    #[test]
    fn test_finding_clamps_confidence() {
        assert_eq!(Finding::new("x", Severity::Info, 1.7).confidence, 1.0);
        assert_eq!(Finding::new("x", Severity::Info, -0.2).confidence, 0.0);
        assert_eq!(Finding::new("x", Severity::Info, f64::NAN).confidence, 0.0);
    }

    #[test]
    fn test_degraded_finding_shape() {
        let id = WorkerId::new("logs");
        let finding = Finding::degraded(&id, "timed out after 5s");

        assert!(finding.is_degraded());
        assert_eq!(finding.severity, Severity::Info);
        assert_eq!(finding.confidence, 0.0);
        assert_eq!(finding.evidence.len(), 1);
        assert!(finding.evidence[0].contains("timed out after 5s"));
    }

    #[test]
    fn test_worker_id_serializes_as_string() {
        let id = WorkerId::new("metrics");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"metrics\"");
    }
}
