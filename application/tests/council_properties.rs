//! End-to-end properties of the council orchestration, driven through
//! `RunCouncilUseCase` with scripted workers and a scripted engine.

use async_trait::async_trait;
use council_application::{
    AnalysisWorker, CouncilEvent, CouncilParams, EngineError, EngineResponse, PromptContext,
    PromptPurpose, ReasoningEngine, RunCouncilInput, RunCouncilUseCase, TelemetrySink, WorkerError,
};
use council_domain::{
    Finding, IntentClassifier, InvestigationMode, Query, RoundContext, Severity, SignalDomain,
    Termination, WorkerId,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

// ==================== Test doubles ====================

#[derive(Clone, Copy)]
enum Behavior {
    Confident(f64),
    Fail,
    Hang,
}

struct ScriptedWorker {
    id: WorkerId,
    domain: SignalDomain,
    behavior: Behavior,
    saw_critique: Arc<Mutex<Vec<usize>>>,
}

#[async_trait]
impl AnalysisWorker for ScriptedWorker {
    fn id(&self) -> &WorkerId {
        &self.id
    }

    fn domain(&self) -> SignalDomain {
        self.domain
    }

    async fn produce(&self, ctx: &RoundContext) -> Result<Finding, WorkerError> {
        if ctx.critic_report.is_some() {
            self.saw_critique.lock().unwrap().push(ctx.round);
        }
        match self.behavior {
            Behavior::Confident(confidence) => Ok(Finding::new(
                format!("{} looks degraded", self.domain),
                Severity::Warning,
                confidence,
            )
            .with_evidence("p99 1.2s")),
            Behavior::Fail => Err(WorkerError::Tool("circuit open for loki".into())),
            Behavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

fn worker(id: &str, domain: SignalDomain, behavior: Behavior) -> Arc<dyn AnalysisWorker> {
    Arc::new(ScriptedWorker {
        id: WorkerId::new(id),
        domain,
        behavior,
        saw_critique: Arc::new(Mutex::new(Vec::new())),
    })
}

/// Critic calls get an empty report; synthesis calls pop the next scripted
/// reply (the last one repeats).
struct ScriptedEngine {
    synthesis: Mutex<VecDeque<String>>,
    synthesis_calls: AtomicUsize,
    critic_calls: AtomicUsize,
}

impl ScriptedEngine {
    fn confidences(values: &[f64]) -> Arc<Self> {
        Self::replies(
            values
                .iter()
                .map(|c| format!(r#"{{"confidence": {}, "summary": "round assessment"}}"#, c))
                .collect(),
        )
    }

    fn replies(replies: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            synthesis: Mutex::new(replies.into()),
            synthesis_calls: AtomicUsize::new(0),
            critic_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ReasoningEngine for ScriptedEngine {
    async fn invoke(&self, prompt: &PromptContext) -> Result<EngineResponse, EngineError> {
        match prompt.purpose {
            PromptPurpose::Critic => {
                self.critic_calls.fetch_add(1, Ordering::SeqCst);
                Ok(EngineResponse::new(
                    r#"{"agreements": [], "contradictions": [], "gaps": [{"workers": ["logs"], "note": "no logs before 13:00"}]}"#,
                ))
            }
            PromptPurpose::Synthesis => {
                self.synthesis_calls.fetch_add(1, Ordering::SeqCst);
                let mut replies = self.synthesis.lock().unwrap();
                let reply = if replies.len() > 1 {
                    replies.pop_front()
                } else {
                    replies.front().cloned()
                };
                reply
                    .map(EngineResponse::new)
                    .ok_or_else(|| EngineError::Fatal("no scripted reply".into()))
            }
            PromptPurpose::Worker(_) => Err(EngineError::Fatal("workers are scripted".into())),
        }
    }
}

#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<&'static str>>,
}

impl TelemetrySink for EventLog {
    fn emit(&self, event: &CouncilEvent) {
        self.events.lock().unwrap().push(event.event_type());
    }
}

fn panel(behavior: Behavior) -> Vec<Arc<dyn AnalysisWorker>> {
    vec![
        worker("alerts", SignalDomain::Alerts, behavior),
        worker("metrics", SignalDomain::Metrics, behavior),
        worker("logs", SignalDomain::Logs, behavior),
    ]
}

fn debate(query: &str) -> RunCouncilInput {
    RunCouncilInput::new(query, "inv-test").with_mode(InvestigationMode::Debate)
}

// ==================== Convergence ====================

#[tokio::test]
async fn debate_stops_once_confidence_reaches_threshold() {
    let engine = ScriptedEngine::confidences(&[0.5, 0.7, 0.9]);
    let use_case = RunCouncilUseCase::new(
        panel(Behavior::Confident(0.95)),
        engine.clone(),
        CouncilParams::default(),
    );

    let result = use_case.execute(debate("root cause of the outage")).await.unwrap();

    assert_eq!(result.rounds_executed, 2);
    assert!((result.overall_confidence - 0.9).abs() < 1e-9);
    assert!(result.complete);
    assert_eq!(result.termination, Termination::ConfidenceReached);
    assert_eq!(result.critic_reports.len(), 2);
    assert_eq!(result.rounds.len(), 3);
    assert_eq!(engine.synthesis_calls.load(Ordering::SeqCst), 3);
    assert_eq!(engine.critic_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn debate_stops_at_round_limit_and_is_complete() {
    let use_case = RunCouncilUseCase::new(
        panel(Behavior::Confident(0.95)),
        ScriptedEngine::confidences(&[0.5]),
        CouncilParams::default().with_max_rounds(3),
    );

    let result = use_case.execute(debate("why is checkout failing")).await.unwrap();

    assert_eq!(result.rounds_executed, 3);
    assert!(result.complete);
    assert_eq!(result.termination, Termination::RoundLimit);
    let deltas: Vec<_> = result.rounds.iter().map(|r| r.confidence_delta).collect();
    assert_eq!(deltas[0], None);
    assert!(deltas[1..].iter().all(|d| d.is_some()));
}

#[tokio::test]
async fn rounds_never_exceed_max_rounds() {
    for max_rounds in 0..4 {
        let use_case = RunCouncilUseCase::new(
            panel(Behavior::Confident(0.95)),
            ScriptedEngine::confidences(&[0.1]),
            CouncilParams::default().with_max_rounds(max_rounds),
        );
        let result = use_case.execute(debate("p1 incident")).await.unwrap();
        assert!(result.rounds_executed <= max_rounds);
        assert_eq!(result.rounds_executed, result.critic_reports.len());
    }
}

#[tokio::test]
async fn workers_receive_critique_in_debate_rounds() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let logs: Arc<dyn AnalysisWorker> = Arc::new(ScriptedWorker {
        id: WorkerId::new("logs"),
        domain: SignalDomain::Logs,
        behavior: Behavior::Confident(0.95),
        saw_critique: Arc::clone(&seen),
    });
    let use_case = RunCouncilUseCase::new(
        vec![logs],
        ScriptedEngine::confidences(&[0.5]),
        CouncilParams::default().with_max_rounds(2),
    );

    use_case.execute(debate("postmortem")).await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
}

#[tokio::test]
async fn single_pass_modes_never_debate() {
    for mode in [InvestigationMode::Fast, InvestigationMode::Standard] {
        let engine = ScriptedEngine::confidences(&[0.2]);
        let use_case = RunCouncilUseCase::new(
            panel(Behavior::Confident(0.6)),
            engine.clone(),
            CouncilParams::default(),
        );
        let result = use_case
            .execute(RunCouncilInput::new("root cause please", "inv").with_mode(mode))
            .await
            .unwrap();

        assert_eq!(result.rounds_executed, 0);
        assert!(result.critic_reports.is_empty());
        assert_eq!(result.termination, Termination::SinglePass);
        assert!(result.complete);
        assert_eq!(engine.critic_calls.load(Ordering::SeqCst), 0);
    }
}

// ==================== Failure isolation ====================

#[tokio::test]
async fn failing_worker_gets_degraded_entry_others_unaffected() {
    let workers = vec![
        worker("w1", SignalDomain::Alerts, Behavior::Confident(0.8)),
        worker("w2", SignalDomain::Metrics, Behavior::Confident(0.8)),
        worker("w3", SignalDomain::Logs, Behavior::Fail),
        worker("w4", SignalDomain::Traces, Behavior::Confident(0.8)),
        worker("w5", SignalDomain::Sql, Behavior::Confident(0.8)),
    ];
    let use_case = RunCouncilUseCase::new(
        workers,
        ScriptedEngine::confidences(&[0.7]),
        CouncilParams::default(),
    );

    let result = use_case
        .execute(RunCouncilInput::new("summary", "inv").with_mode(InvestigationMode::Standard))
        .await
        .unwrap();

    assert_eq!(result.findings.len(), 5);
    let failed = &result.findings[&WorkerId::new("w3")];
    assert_eq!(failed.confidence, 0.0);
    assert_eq!(failed.severity, Severity::Info);
    assert!(failed.evidence.iter().any(|e| e.contains("circuit open for loki")));
    for id in ["w1", "w2", "w4", "w5"] {
        let finding = &result.findings[&WorkerId::new(id)];
        assert!(!finding.is_degraded());
        assert_eq!(finding.confidence, 0.8);
    }
    assert_eq!(result.overall_severity, Severity::Warning);
}

#[tokio::test]
async fn total_worker_failure_still_fills_every_entry() {
    let engine = ScriptedEngine::confidences(&[0.9]);
    let use_case = RunCouncilUseCase::new(
        panel(Behavior::Fail),
        engine.clone(),
        CouncilParams::default().with_max_rounds(2),
    );

    let result = use_case.execute(debate("outage")).await.unwrap();

    assert_eq!(result.findings.len(), 3);
    assert!(result.findings.values().all(Finding::is_degraded));
    assert_eq!(result.overall_severity, Severity::Info);
    assert_eq!(result.overall_confidence, 0.0);
    assert_eq!(engine.synthesis_calls.load(Ordering::SeqCst), 0);
    assert_eq!(result.rounds_executed, 2);
    for (i, report) in result.critic_reports.iter().enumerate() {
        assert_eq!(report.round, i + 1);
    }
}

#[tokio::test]
async fn confidence_stays_within_evidence_bounds() {
    let use_case = RunCouncilUseCase::new(
        vec![worker("logs", SignalDomain::Logs, Behavior::Confident(0.4))],
        ScriptedEngine::confidences(&[1.0]),
        CouncilParams::default(),
    );

    let result = use_case
        .execute(RunCouncilInput::new("summary", "inv").with_mode(InvestigationMode::Standard))
        .await
        .unwrap();

    // One finding cannot corroborate itself: no agreement bonus.
    assert!(result.overall_confidence <= 0.4 + 1e-9);
}

// ==================== Synthesis failure ====================

#[tokio::test]
async fn synthesis_failure_in_debate_keeps_previous_round() {
    let engine = ScriptedEngine::replies(vec![
        r#"{"confidence": 0.5, "summary": "round zero"}"#.to_string(),
        "not json at all".to_string(),
    ]);
    let use_case = RunCouncilUseCase::new(
        panel(Behavior::Confident(0.95)),
        engine,
        CouncilParams::default(),
    );

    let result = use_case.execute(debate("outage")).await.unwrap();

    assert!(!result.complete);
    assert_eq!(result.termination, Termination::SynthesisFailed);
    assert_eq!(result.synthesis, "round zero");
    assert!((result.overall_confidence - 0.5).abs() < 1e-9);
    assert_eq!(result.rounds_executed, 0);
    assert_eq!(result.findings.len(), 3);
}

#[tokio::test]
async fn synthesis_failure_in_round_zero_returns_minimal_result() {
    let use_case = RunCouncilUseCase::new(
        panel(Behavior::Confident(0.95)),
        ScriptedEngine::replies(vec!["garbage".to_string()]),
        CouncilParams::default(),
    );

    let result = use_case
        .execute(RunCouncilInput::new("summary", "inv").with_mode(InvestigationMode::Standard))
        .await
        .unwrap();

    assert!(!result.complete);
    assert_eq!(result.overall_severity, Severity::Info);
    assert_eq!(result.overall_confidence, 0.0);
    assert_eq!(result.findings.len(), 3);
}

// ==================== Timeout & cancellation ====================

#[tokio::test(start_paused = true)]
async fn pipeline_timeout_returns_partial_result_within_budget() {
    let workers = vec![
        worker("alerts", SignalDomain::Alerts, Behavior::Confident(0.7)),
        worker("logs", SignalDomain::Logs, Behavior::Hang),
    ];
    let use_case = RunCouncilUseCase::new(
        workers,
        ScriptedEngine::confidences(&[0.5]),
        CouncilParams::default().with_pipeline_timeout(Duration::from_secs(1)),
    );

    let started = tokio::time::Instant::now();
    let result = use_case.execute(debate("outage")).await.unwrap();

    assert!(started.elapsed() <= Duration::from_millis(1100));
    assert!(!result.complete);
    assert_eq!(result.findings.len(), 2);
    assert!(result.rounds_executed <= 3);
}

#[tokio::test(start_paused = true)]
async fn critic_timeouts_do_not_stop_the_debate() {
    struct SlowCritic(Arc<ScriptedEngine>);

    #[async_trait]
    impl ReasoningEngine for SlowCritic {
        async fn invoke(&self, prompt: &PromptContext) -> Result<EngineResponse, EngineError> {
            if prompt.purpose == PromptPurpose::Critic {
                std::future::pending::<()>().await;
            }
            self.0.invoke(prompt).await
        }
    }

    let use_case = RunCouncilUseCase::new(
        panel(Behavior::Confident(0.95)),
        Arc::new(SlowCritic(ScriptedEngine::confidences(&[0.6]))),
        CouncilParams::default().with_pipeline_timeout(Duration::from_secs(9)),
    );

    let result = use_case.execute(debate("outage")).await.unwrap();

    // Rounds 1 and 2 each lose their critic to the stage budget and still
    // complete; round 3's critic budget runs into the pipeline deadline.
    assert_eq!(result.rounds_executed, 2);
    assert!(result
        .critic_reports
        .iter()
        .all(|r| r.is_empty() && r.failure.as_deref().is_some_and(|f| f.starts_with("timed out"))));
    assert!(!result.complete);
    assert_eq!(result.termination, Termination::PipelineTimeout);
    assert!((result.overall_confidence - 0.6).abs() < 1e-9);
    assert_eq!(result.rounds.len(), 3);
}

#[tokio::test]
async fn unrepresentable_pipeline_timeout_still_runs() {
    let use_case = RunCouncilUseCase::new(
        panel(Behavior::Confident(0.95)),
        ScriptedEngine::confidences(&[0.9]),
        CouncilParams::default().with_pipeline_timeout(Duration::from_secs(u64::MAX)),
    );

    let result = use_case.execute(debate("outage")).await.unwrap();

    assert!(result.complete);
    assert_eq!(result.termination, Termination::ConfidenceReached);
}

#[tokio::test]
async fn huge_round_limits_do_not_break_stage_budgets() {
    for max_rounds in [u32::MAX as usize, usize::MAX] {
        let use_case = RunCouncilUseCase::new(
            panel(Behavior::Confident(0.95)),
            ScriptedEngine::confidences(&[0.9]),
            CouncilParams::default().with_max_rounds(max_rounds),
        );

        let result = use_case.execute(debate("outage")).await.unwrap();

        assert!(result.complete);
        assert_eq!(result.termination, Termination::ConfidenceReached);
        assert_eq!(result.rounds_executed, 0);
    }
}

#[tokio::test]
async fn caller_cancellation_behaves_like_timeout() {
    let token = CancellationToken::new();
    token.cancel();
    let log = Arc::new(EventLog::default());
    let use_case = RunCouncilUseCase::new(
        panel(Behavior::Hang),
        ScriptedEngine::confidences(&[0.5]),
        CouncilParams::default(),
    )
    .with_cancellation(token)
    .with_telemetry(log.clone());

    let result = use_case.execute(debate("outage")).await.unwrap();

    assert!(!result.complete);
    assert_eq!(result.termination, Termination::Cancelled);
    assert_eq!(result.findings.len(), 3);
    let events = log.events.lock().unwrap();
    assert_eq!(events.first(), Some(&"investigation_started"));
    assert_eq!(events.last(), Some(&"investigation_finished"));
}

// ==================== Classifier ====================

#[test]
fn classifier_is_idempotent() {
    let classifier = IntentClassifier::default();
    for text in [
        "is the api healthy?",
        "Why is the orders database failing after the 14:00 deploy?",
        "summarize trace latency for search",
        "P0: payments down",
    ] {
        let query = Query::new(text);
        let first = classifier.classify(&query);
        for _ in 0..5 {
            assert_eq!(classifier.classify(&query), first);
        }
    }
}
