//! Investigation result value objects.
//!
//! - [`Synthesis`] - one round's merged assessment
//! - [`CouncilResult`] - the aggregate returned to the caller, never mutated
//!   after it is handed over

use super::convergence::{RoundRecord, Termination};
use super::critique::CriticReport;
use super::finding::{Finding, Severity, WorkerId};
use super::mode::{InvestigationMode, SignalDomain};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Merged assessment produced by the synthesizer for one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synthesis {
    pub overall_severity: Severity,
    pub overall_confidence: f64,
    pub text: String,
}

impl Synthesis {
    pub fn new(overall_severity: Severity, overall_confidence: f64, text: impl Into<String>) -> Self {
        Self {
            overall_severity,
            overall_confidence,
            text: text.into(),
        }
    }

    /// Assessment used when no non-degraded evidence exists.
    pub fn no_evidence(text: impl Into<String>) -> Self {
        Self::new(Severity::Info, 0.0, text)
    }
}

/// Final result of one investigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouncilResult {
    pub investigation_id: String,
    pub query: String,
    pub mode: InvestigationMode,
    pub primary_signal: SignalDomain,
    pub overall_severity: Severity,
    pub overall_confidence: f64,
    pub synthesis: String,
    /// One entry per dispatched worker, present even when the worker failed
    pub findings: BTreeMap<WorkerId, Finding>,
    /// One report per completed debate round, in order
    pub critic_reports: Vec<CriticReport>,
    /// Convergence history, one record per synthesized round (round 0 first)
    pub rounds: Vec<RoundRecord>,
    pub rounds_executed: usize,
    pub duration_ms: u64,
    /// False when the pipeline stopped before reaching a terminal state
    pub complete: bool,
    pub termination: Termination,
}

impl CouncilResult {
    /// Findings that came from workers which actually succeeded
    pub fn healthy_findings(&self) -> impl Iterator<Item = (&WorkerId, &Finding)> {
        self.findings.iter().filter(|(_, f)| !f.is_degraded())
    }

    /// Number of placeholder findings
    pub fn degraded_count(&self) -> usize {
        self.findings.values().filter(|f| f.is_degraded()).count()
    }

    pub fn is_partial(&self) -> bool {
        !self.complete || self.degraded_count() > 0
    }
}
