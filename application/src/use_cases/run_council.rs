//! Run Council use case
//!
//! Orchestrates one investigation end to end:
//!
//! ```text
//! Init → Dispatched → Synthesized → [DebateRound(n) → Dispatched → Synthesized]* → Done
//! ```
//!
//! The orchestrator is the only owner of round-scoped state (convergence
//! tracker, critic reports, latest synthesis). Workers only ever see an
//! immutable [`RoundContext`] assembled after the previous round's join
//! barrier. Every recoverable failure is folded into the returned
//! [`CouncilResult`]; `execute` only errors on a bad worker set.

use crate::config::CouncilParams;
use crate::ports::reasoning_engine::ReasoningEngine;
use crate::ports::telemetry::{CouncilEvent, NoTelemetry, TelemetrySink};
use crate::use_cases::critic::Critic;
use crate::use_cases::specialist::AnalysisWorker;
use crate::use_cases::synthesizer::Synthesizer;
use crate::use_cases::worker_pool::WorkerPoolExecutor;
use council_domain::{
    ConvergenceTracker, CouncilResult, CriticReport, Finding, IntentClassifier, InvestigationMode,
    OrchestratorState, Query, RoundContext, SignalDomain, Synthesis, Termination, WorkerId,
};
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Precondition failures; everything else ends up inside the result
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunCouncilError {
    #[error("No workers configured")]
    NoWorkers,

    #[error("Duplicate worker id: {0}")]
    DuplicateWorker(WorkerId),
}

/// Input for the RunCouncil use case
#[derive(Debug, Clone)]
pub struct RunCouncilInput {
    pub query: Query,
    pub investigation_id: String,
    /// Free-text session context passed to every worker
    pub session_context: Option<String>,
    /// Skip the classifier's mode decision
    pub mode_override: Option<InvestigationMode>,
}

impl RunCouncilInput {
    pub fn new(query: impl Into<Query>, investigation_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            investigation_id: investigation_id.into(),
            session_context: None,
            mode_override: None,
        }
    }

    pub fn with_session_context(mut self, context: impl Into<String>) -> Self {
        self.session_context = Some(context.into());
        self
    }

    pub fn with_mode(mut self, mode: InvestigationMode) -> Self {
        self.mode_override = Some(mode);
        self
    }
}

/// Use case for running a council investigation
pub struct RunCouncilUseCase {
    workers: Vec<Arc<dyn AnalysisWorker>>,
    engine: Arc<dyn ReasoningEngine>,
    params: CouncilParams,
    classifier: IntentClassifier,
    telemetry: Arc<dyn TelemetrySink>,
    cancellation: Option<CancellationToken>,
}

impl RunCouncilUseCase {
    pub fn new(
        workers: Vec<Arc<dyn AnalysisWorker>>,
        engine: Arc<dyn ReasoningEngine>,
        params: CouncilParams,
    ) -> Self {
        Self {
            workers,
            engine,
            params,
            classifier: IntentClassifier::default(),
            telemetry: Arc::new(NoTelemetry),
            cancellation: None,
        }
    }

    pub fn with_classifier(mut self, classifier: IntentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Cancelling this token ends the investigation like a pipeline timeout.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn params(&self) -> &CouncilParams {
        &self.params
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    pub async fn execute(&self, input: RunCouncilInput) -> Result<CouncilResult, RunCouncilError> {
        self.check_workers()?;

        let intent = self.classifier.classify(&input.query);
        let mode = input.mode_override.unwrap_or(intent.mode);
        let workers = self.select_workers(mode, intent.primary_signal);

        info!(
            "Starting investigation {} in {} mode (primary signal: {}, {} workers)",
            input.investigation_id,
            mode,
            intent.primary_signal,
            workers.len()
        );

        let caller = self.cancellation.clone().unwrap_or_default();
        let started = Instant::now();
        let run = CouncilRun {
            use_case: self,
            ctx: RoundContext::initial(
                input.investigation_id,
                input.query,
                mode,
                intent.primary_signal,
                input.session_context,
            ),
            dispatched: workers.iter().map(|w| w.id().clone()).collect(),
            workers,
            pool: WorkerPoolExecutor::new(Arc::clone(&self.telemetry)),
            critic: Critic::new(Arc::clone(&self.engine)),
            synthesizer: Synthesizer::new(Arc::clone(&self.engine), self.params.agreement_bonus),
            state: OrchestratorState::Init,
            tracker: ConvergenceTracker::new(
                self.params.confidence_threshold,
                self.params.max_rounds,
            ),
            critic_reports: Vec::new(),
            latest: None,
            pending_findings: None,
            started,
            deadline: self.params.deadline_from(started),
            worker_token: caller.child_token(),
            caller,
        };

        Ok(run.drive().await)
    }

    fn check_workers(&self) -> Result<(), RunCouncilError> {
        if self.workers.is_empty() {
            return Err(RunCouncilError::NoWorkers);
        }
        let mut seen = BTreeSet::new();
        for worker in &self.workers {
            if !seen.insert(worker.id()) {
                return Err(RunCouncilError::DuplicateWorker(worker.id().clone()));
            }
        }
        Ok(())
    }

    /// Fast dispatches the first worker for the primary signal; the other
    /// modes dispatch everyone.
    fn select_workers(
        &self,
        mode: InvestigationMode,
        primary_signal: SignalDomain,
    ) -> Vec<Arc<dyn AnalysisWorker>> {
        if mode.is_single_worker() {
            if let Some(worker) = self.workers.iter().find(|w| w.domain() == primary_signal) {
                return vec![Arc::clone(worker)];
            }
            warn!(
                "No worker covers primary signal {}; dispatching all workers",
                primary_signal
            );
        }
        self.workers.clone()
    }
}

/// Why a guarded step did not finish
#[derive(Debug, Clone, Copy)]
enum Interrupt {
    Timeout,
    Cancelled,
}

impl From<Interrupt> for Termination {
    fn from(interrupt: Interrupt) -> Self {
        match interrupt {
            Interrupt::Timeout => Termination::PipelineTimeout,
            Interrupt::Cancelled => Termination::Cancelled,
        }
    }
}

/// Round-scoped state owned by one `execute` call
struct CouncilRun<'a> {
    use_case: &'a RunCouncilUseCase,
    ctx: RoundContext,
    workers: Vec<Arc<dyn AnalysisWorker>>,
    dispatched: Vec<WorkerId>,
    pool: WorkerPoolExecutor,
    critic: Critic,
    synthesizer: Synthesizer,
    state: OrchestratorState,
    tracker: ConvergenceTracker,
    critic_reports: Vec<CriticReport>,
    /// Most recent fully synthesized round
    latest: Option<(BTreeMap<WorkerId, Finding>, Synthesis)>,
    /// Findings joined in the current round but not yet synthesized
    pending_findings: Option<BTreeMap<WorkerId, Finding>>,
    started: Instant,
    deadline: Instant,
    caller: CancellationToken,
    worker_token: CancellationToken,
}

impl CouncilRun<'_> {
    async fn drive(mut self) -> CouncilResult {
        self.emit(CouncilEvent::InvestigationStarted {
            investigation_id: self.ctx.investigation_id.clone(),
            mode: self.ctx.mode,
            primary_signal: self.ctx.primary_signal,
            workers: self.dispatched.clone(),
        });

        let termination = match self.run_rounds().await {
            Ok(termination) => termination,
            Err(interrupt) => {
                self.worker_token.cancel();
                warn!(
                    "Investigation {} interrupted ({:?}) in state {}",
                    self.ctx.investigation_id, interrupt, self.state
                );
                interrupt.into()
            }
        };

        self.finish(termination)
    }

    /// Runs round 0 and, in Debate mode, the debate loop. Returns how the
    /// investigation ended, or the interrupt that cut it short.
    async fn run_rounds(&mut self) -> Result<Termination, Interrupt> {
        if !self.run_round(None).await? {
            return Ok(Termination::SynthesisFailed);
        }

        if !self.ctx.mode.is_debate() {
            return Ok(Termination::SinglePass);
        }

        loop {
            let confidence = self
                .latest
                .as_ref()
                .map_or(0.0, |(_, s)| s.overall_confidence);
            if let Some(termination) = self.tracker.should_stop(confidence, self.critic_reports.len())
            {
                info!(
                    "Debate loop stopping after {} rounds: {}",
                    self.critic_reports.len(),
                    termination
                );
                return Ok(termination);
            }

            let round = self.critic_reports.len() + 1;
            self.transition(OrchestratorState::DebateRound(round));

            let Some((findings, _)) = self.latest.as_ref() else {
                return Ok(Termination::SynthesisFailed);
            };
            let findings = findings.clone();

            let budget = self.stage_budget(round);
            let report = self
                .guard(self.critic.review(
                    &self.ctx.investigation_id,
                    self.ctx.query.text(),
                    round,
                    &findings,
                    budget,
                ))
                .await?;

            self.emit(CouncilEvent::CriticCompleted {
                investigation_id: self.ctx.investigation_id.clone(),
                round,
                agreements: report.agreements.len(),
                contradictions: report.contradictions.len(),
                gaps: report.gaps.len(),
                failure: report.failure.clone(),
            });

            // Strictly after the previous join barrier and synthesis.
            self.ctx = self.ctx.next_round(findings, report.clone());

            if !self.run_round(Some(report)).await? {
                return Ok(Termination::SynthesisFailed);
            }
        }
    }

    /// Dispatch and synthesize one round. Returns false if synthesis failed.
    async fn run_round(&mut self, report: Option<CriticReport>) -> Result<bool, Interrupt> {
        let round = self.ctx.round;
        let round_started = Instant::now();

        self.transition(OrchestratorState::Dispatched);
        let budget = self.stage_budget(round);
        let ctx = Arc::new(self.ctx.clone());
        let findings = self
            .guard(
                self.pool
                    .run_round(&self.workers, ctx, budget, &self.worker_token),
            )
            .await?;
        self.pending_findings = Some(findings.clone());

        let budget = self.stage_budget(round);
        let synthesis = self
            .guard(self.synthesizer.synthesize(
                &self.ctx.investigation_id,
                self.ctx.query.text(),
                round,
                &findings,
                report.as_ref(),
                budget,
            ))
            .await?;

        let synthesis = match synthesis {
            Ok(synthesis) => synthesis,
            Err(e) => {
                warn!("Synthesis failed in round {}: {}", round, e);
                return Ok(false);
            }
        };

        let record = self
            .tracker
            .record(
                round,
                synthesis.overall_confidence,
                report.as_ref(),
                round_started.elapsed().as_millis() as u64,
            )
            .clone();
        debug!(
            "Round {} synthesized: {} at {:.2} (delta {:?})",
            round, synthesis.overall_severity, synthesis.overall_confidence, record.confidence_delta
        );

        self.transition(OrchestratorState::Synthesized);
        self.emit(CouncilEvent::RoundSynthesized {
            investigation_id: self.ctx.investigation_id.clone(),
            round,
            severity: synthesis.overall_severity,
            confidence: synthesis.overall_confidence,
            confidence_delta: record.confidence_delta,
        });

        if let Some(report) = report {
            self.critic_reports.push(report);
        }
        self.pending_findings = None;
        self.latest = Some((findings, synthesis));
        Ok(true)
    }

    /// Race a step against the pipeline deadline and caller cancellation.
    async fn guard<F: Future>(&self, step: F) -> Result<F::Output, Interrupt> {
        tokio::select! {
            biased;
            _ = self.caller.cancelled() => Err(Interrupt::Cancelled),
            _ = tokio::time::sleep_until(self.deadline) => Err(Interrupt::Timeout),
            output = step => Ok(output),
        }
    }

    /// Per-stage budget: remaining time split across the rounds still to run.
    fn stage_budget(&self, round: usize) -> Duration {
        let rounds_left = if self.ctx.mode.is_debate() {
            self.use_case
                .params
                .max_rounds
                .saturating_sub(round)
                .saturating_add(1)
        } else {
            1
        };
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        self.use_case.params.stage_budget(remaining, rounds_left)
    }

    fn transition(&mut self, next: OrchestratorState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!("State {} -> {}", self.state, next);
        self.emit(CouncilEvent::StateTransition {
            investigation_id: self.ctx.investigation_id.clone(),
            from: self.state,
            to: next,
        });
        self.state = next;
    }

    fn emit(&self, event: CouncilEvent) {
        self.use_case.telemetry.emit(&event);
    }

    fn finish(mut self, termination: Termination) -> CouncilResult {
        self.transition(OrchestratorState::Done);

        let (findings, synthesis) = match self.latest.take() {
            Some(latest) => latest,
            None => {
                let findings = self.pending_findings.take().unwrap_or_else(|| {
                    self.dispatched
                        .iter()
                        .map(|id| (id.clone(), Finding::degraded(id, "cancelled by pipeline timeout")))
                        .collect()
                });
                let synthesis = Synthesis::no_evidence(match termination {
                    Termination::SynthesisFailed => "Synthesis failed; no assessment is available.",
                    _ => "The investigation stopped before any assessment was produced.",
                });
                (findings, synthesis)
            }
        };

        let duration_ms = self.started.elapsed().as_millis() as u64;
        let rounds_executed = self.critic_reports.len();
        let complete = termination.is_complete();

        self.emit(CouncilEvent::InvestigationFinished {
            investigation_id: self.ctx.investigation_id.clone(),
            termination,
            complete,
            rounds_executed,
            duration_ms,
        });
        info!(
            "Investigation {} finished: {} after {} debate rounds in {}ms",
            self.ctx.investigation_id, termination, rounds_executed, duration_ms
        );

        CouncilResult {
            investigation_id: self.ctx.investigation_id,
            query: self.ctx.query.text().to_string(),
            mode: self.ctx.mode,
            primary_signal: self.ctx.primary_signal,
            overall_severity: synthesis.overall_severity,
            overall_confidence: synthesis.overall_confidence,
            synthesis: synthesis.text,
            findings,
            critic_reports: self.critic_reports,
            rounds: self.tracker.into_records(),
            rounds_executed,
            duration_ms,
            complete,
            termination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::reasoning_engine::{EngineError, EngineResponse, PromptContext};
    use crate::use_cases::specialist::WorkerError;
    use async_trait::async_trait;
    use council_domain::Severity;
    use std::sync::Mutex;

    struct StaticWorker {
        id: WorkerId,
        domain: SignalDomain,
    }

    #[async_trait]
    impl AnalysisWorker for StaticWorker {
        fn id(&self) -> &WorkerId {
            &self.id
        }

        fn domain(&self) -> SignalDomain {
            self.domain
        }

        async fn produce(&self, _ctx: &RoundContext) -> Result<Finding, WorkerError> {
            Ok(Finding::new("fine", Severity::Warning, 0.9))
        }
    }

    fn worker(id: &str, domain: SignalDomain) -> Arc<dyn AnalysisWorker> {
        Arc::new(StaticWorker {
            id: WorkerId::new(id),
            domain,
        })
    }

    struct SynthesisOnly;

    #[async_trait]
    impl ReasoningEngine for SynthesisOnly {
        async fn invoke(&self, _prompt: &PromptContext) -> Result<EngineResponse, EngineError> {
            Ok(EngineResponse::new(r#"{"confidence": 0.6, "summary": "ok"}"#))
        }
    }

    #[derive(Default)]
    struct StateLog {
        states: Mutex<Vec<OrchestratorState>>,
    }

    impl TelemetrySink for StateLog {
        fn emit(&self, event: &CouncilEvent) {
            if let CouncilEvent::StateTransition { to, .. } = event {
                self.states.lock().unwrap().push(*to);
            }
        }
    }

    #[tokio::test]
    async fn test_no_workers_is_an_error() {
        let use_case = RunCouncilUseCase::new(vec![], Arc::new(SynthesisOnly), CouncilParams::default());
        let err = use_case
            .execute(RunCouncilInput::new("is it up", "inv"))
            .await
            .unwrap_err();
        assert_eq!(err, RunCouncilError::NoWorkers);
    }

    #[tokio::test]
    async fn test_duplicate_worker_is_an_error() {
        let use_case = RunCouncilUseCase::new(
            vec![worker("logs", SignalDomain::Logs), worker("logs", SignalDomain::Logs)],
            Arc::new(SynthesisOnly),
            CouncilParams::default(),
        );
        let err = use_case
            .execute(RunCouncilInput::new("is it up", "inv"))
            .await
            .unwrap_err();
        assert_eq!(err, RunCouncilError::DuplicateWorker(WorkerId::new("logs")));
    }

    #[tokio::test]
    async fn test_fast_dispatches_primary_signal_worker() {
        let use_case = RunCouncilUseCase::new(
            vec![worker("metrics", SignalDomain::Metrics), worker("logs", SignalDomain::Logs)],
            Arc::new(SynthesisOnly),
            CouncilParams::default(),
        );
        let result = use_case
            .execute(RunCouncilInput::new("quick check on cpu", "inv"))
            .await
            .unwrap();

        assert_eq!(result.mode, InvestigationMode::Fast);
        assert_eq!(result.findings.len(), 1);
        assert!(result.findings.contains_key(&WorkerId::new("metrics")));
        assert_eq!(result.termination, Termination::SinglePass);
    }

    #[tokio::test]
    async fn test_fast_without_matching_worker_dispatches_all() {
        let use_case = RunCouncilUseCase::new(
            vec![worker("logs", SignalDomain::Logs), worker("traces", SignalDomain::Traces)],
            Arc::new(SynthesisOnly),
            CouncilParams::default(),
        );
        let result = use_case
            .execute(RunCouncilInput::new("quick check on cpu", "inv"))
            .await
            .unwrap();
        assert_eq!(result.findings.len(), 2);
    }

    #[tokio::test]
    async fn test_state_sequence_for_single_debate_round() {
        let log = Arc::new(StateLog::default());
        let use_case = RunCouncilUseCase::new(
            vec![worker("logs", SignalDomain::Logs)],
            Arc::new(SynthesisOnly),
            CouncilParams::default().with_max_rounds(1),
        )
        .with_telemetry(log.clone());

        let result = use_case
            .execute(RunCouncilInput::new("anything", "inv").with_mode(InvestigationMode::Debate))
            .await
            .unwrap();

        use OrchestratorState::*;
        assert_eq!(
            *log.states.lock().unwrap(),
            vec![Dispatched, Synthesized, DebateRound(1), Dispatched, Synthesized, Done]
        );
        assert_eq!(result.rounds_executed, 1);
        assert_eq!(result.rounds.len(), 2);
        assert_eq!(result.termination, Termination::RoundLimit);
    }
}
