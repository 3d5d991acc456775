//! Per-round shared input context.
//!
//! A [`RoundContext`] is assembled by the orchestrator strictly after the
//! previous round's join barrier and synthesis. It is shared read-only
//! (behind an `Arc`) by every worker in the round; nothing in it is mutated
//! once built.

use super::critique::CriticReport;
use super::finding::{Finding, WorkerId};
use super::mode::{InvestigationMode, SignalDomain};
use crate::core::query::Query;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundContext {
    pub investigation_id: String,
    pub query: Query,
    pub mode: InvestigationMode,
    pub primary_signal: SignalDomain,
    /// 0 for the initial pass
    pub round: usize,
    /// Caller-provided session context (free text), if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_context: Option<String>,
    /// Findings from the previous round, keyed by worker
    #[serde(default)]
    pub prior_findings: BTreeMap<WorkerId, Finding>,
    /// Critic report that triggered this round
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critic_report: Option<CriticReport>,
}

impl RoundContext {
    /// Context for round 0: no prior findings, no critique.
    pub fn initial(
        investigation_id: impl Into<String>,
        query: Query,
        mode: InvestigationMode,
        primary_signal: SignalDomain,
        session_context: Option<String>,
    ) -> Self {
        Self {
            investigation_id: investigation_id.into(),
            query,
            mode,
            primary_signal,
            round: 0,
            session_context,
            prior_findings: BTreeMap::new(),
            critic_report: None,
        }
    }

    /// Context for the next debate round, built from a completed round.
    pub fn next_round(&self, findings: BTreeMap<WorkerId, Finding>, critic: CriticReport) -> Self {
        Self {
            investigation_id: self.investigation_id.clone(),
            query: self.query.clone(),
            mode: self.mode,
            primary_signal: self.primary_signal,
            round: self.round + 1,
            session_context: self.session_context.clone(),
            prior_findings: findings,
            critic_report: Some(critic),
        }
    }

    /// This worker's own finding from the previous round
    pub fn prior_finding_of(&self, worker: &WorkerId) -> Option<&Finding> {
        self.prior_findings.get(worker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::investigation::finding::Severity;

    #[test]
    fn test_next_round_threads_findings_and_critique() {
        let ctx = RoundContext::initial(
            "inv-1",
            Query::new("why is checkout failing"),
            InvestigationMode::Debate,
            SignalDomain::Logs,
            None,
        );

        let mut findings = BTreeMap::new();
        findings.insert(
            WorkerId::new("logs"),
            Finding::new("5xx spike", Severity::Warning, 0.6),
        );

        let next = ctx.next_round(findings, CriticReport::new(1));

        assert_eq!(next.round, 1);
        assert_eq!(next.investigation_id, "inv-1");
        assert!(next.critic_report.is_some());
        assert_eq!(
            next.prior_finding_of(&WorkerId::new("logs")).unwrap().summary,
            "5xx spike"
        );
        assert!(ctx.prior_findings.is_empty());
    }
}
