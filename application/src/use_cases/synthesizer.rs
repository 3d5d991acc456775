//! Synthesizer: merges one round's findings into a [`Synthesis`].
//!
//! Severity is computed by rule from the non-degraded findings. The engine
//! only proposes the narrative and a confidence, and that confidence is
//! clamped to the evidence ceiling before it leaves this module.

use crate::ports::reasoning_engine::{EngineError, PromptContext, PromptPurpose, ReasoningEngine};
use crate::use_cases::shared::invoke_with_retry;
use council_domain::investigation::aggregation::{
    bound_confidence, confidence_ceiling, overall_severity,
};
use council_domain::investigation::parsing::parse_synthesis;
use council_domain::{CriticReport, Finding, PromptTemplate, Synthesis, WorkerId};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthesisError {
    #[error("synthesis timed out after {0:?}")]
    Timeout(Duration),

    #[error("synthesis engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("malformed synthesis: {0}")]
    MalformedResponse(String),
}

pub struct Synthesizer {
    engine: Arc<dyn ReasoningEngine>,
    agreement_bonus: f64,
}

impl Synthesizer {
    pub fn new(engine: Arc<dyn ReasoningEngine>, agreement_bonus: f64) -> Self {
        Self {
            engine,
            agreement_bonus,
        }
    }

    pub async fn synthesize(
        &self,
        investigation_id: &str,
        query: &str,
        round: usize,
        findings: &BTreeMap<WorkerId, Finding>,
        critic: Option<&CriticReport>,
        budget: Duration,
    ) -> Result<Synthesis, SynthesisError> {
        let ceiling = confidence_ceiling(findings, critic, self.agreement_bonus);

        if findings.values().all(Finding::is_degraded) {
            warn!("Round {}: no usable findings, skipping engine synthesis", round);
            return Ok(Synthesis::no_evidence(
                "No worker produced usable evidence; the assessment is inconclusive.",
            ));
        }

        let prompt = PromptContext::new(
            PromptPurpose::Synthesis,
            investigation_id,
            round,
            PromptTemplate::synthesis_system(),
            PromptTemplate::synthesis_prompt(query, findings, critic),
        );

        let response =
            tokio::time::timeout(budget, invoke_with_retry(self.engine.as_ref(), &prompt))
                .await
                .map_err(|_| SynthesisError::Timeout(budget))??;

        let (proposed, text) = parse_synthesis(&response.text)
            .map_err(|e| SynthesisError::MalformedResponse(e.to_string()))?;

        let confidence = bound_confidence(proposed, ceiling);
        if confidence < proposed {
            debug!(
                "Round {}: confidence {:.2} clamped to ceiling {:.2}",
                round, proposed, ceiling
            );
        }

        Ok(Synthesis::new(overall_severity(findings), confidence, text))
    }
}
