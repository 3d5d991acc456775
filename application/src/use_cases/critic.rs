//! Critic: cross-examines one round's findings.
//!
//! Never fails. A timeout, engine error, or malformed reply yields an empty
//! [`CriticReport`] whose `failure` note says which of those happened, and
//! the debate continues.

use crate::ports::reasoning_engine::{EngineError, PromptContext, PromptPurpose, ReasoningEngine};
use crate::use_cases::shared::invoke_with_retry;
use council_domain::investigation::parsing::parse_critic_report;
use council_domain::{CriticReport, Finding, PromptTemplate, WorkerId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Why the critic produced no usable report
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CriticError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("malformed output: {0}")]
    MalformedResponse(String),
}

pub struct Critic {
    engine: Arc<dyn ReasoningEngine>,
}

impl Critic {
    pub fn new(engine: Arc<dyn ReasoningEngine>) -> Self {
        Self { engine }
    }

    /// Review `findings` and produce the report for debate round `round`.
    ///
    /// Failures are folded into [`CriticReport::failed`].
    pub async fn review(
        &self,
        investigation_id: &str,
        query: &str,
        round: usize,
        findings: &BTreeMap<WorkerId, Finding>,
        budget: Duration,
    ) -> CriticReport {
        match self
            .try_review(investigation_id, query, round, findings, budget)
            .await
        {
            Ok(report) => {
                debug!(
                    "Critic round {}: {} agreements, {} contradictions, {} gaps",
                    round,
                    report.agreements.len(),
                    report.contradictions.len(),
                    report.gaps.len()
                );
                report
            }
            Err(e) => {
                warn!("Critic failed in round {}: {}", round, e);
                CriticReport::failed(round, e.to_string())
            }
        }
    }

    async fn try_review(
        &self,
        investigation_id: &str,
        query: &str,
        round: usize,
        findings: &BTreeMap<WorkerId, Finding>,
        budget: Duration,
    ) -> Result<CriticReport, CriticError> {
        let prompt = PromptContext::new(
            PromptPurpose::Critic,
            investigation_id,
            round,
            PromptTemplate::critic_system(),
            PromptTemplate::critic_prompt(query, findings),
        );

        let response =
            tokio::time::timeout(budget, invoke_with_retry(self.engine.as_ref(), &prompt))
                .await
                .map_err(|_| CriticError::Timeout(budget))??;

        let report = parse_critic_report(&response.text, round)
            .map_err(|e| CriticError::MalformedResponse(e.to_string()))?;

        let known: BTreeSet<WorkerId> = findings.keys().cloned().collect();
        Ok(report.retain_known(&known))
    }
}
