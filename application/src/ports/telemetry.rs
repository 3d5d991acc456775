//! Telemetry port
//!
//! One [`CouncilEvent`] is emitted per orchestrator state transition and per
//! worker completion. Sinks are fire-and-forget: [`TelemetrySink::emit`] is
//! synchronous, cannot fail, and must return without waiting on I/O.
//!
//! This is separate from `tracing`-based diagnostics: tracing carries
//! human-readable log lines, while these events feed dashboards and the
//! terminal progress display.

use council_domain::{
    InvestigationMode, OrchestratorState, Severity, SignalDomain, Termination, WorkerId,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouncilEvent {
    InvestigationStarted {
        investigation_id: String,
        mode: InvestigationMode,
        primary_signal: SignalDomain,
        workers: Vec<WorkerId>,
    },
    StateTransition {
        investigation_id: String,
        from: OrchestratorState,
        to: OrchestratorState,
    },
    WorkerCompleted {
        investigation_id: String,
        round: usize,
        worker: WorkerId,
        degraded: bool,
        severity: Severity,
        confidence: f64,
        elapsed_ms: u64,
    },
    CriticCompleted {
        investigation_id: String,
        round: usize,
        agreements: usize,
        contradictions: usize,
        gaps: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        failure: Option<String>,
    },
    RoundSynthesized {
        investigation_id: String,
        round: usize,
        severity: Severity,
        confidence: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        confidence_delta: Option<f64>,
    },
    InvestigationFinished {
        investigation_id: String,
        termination: Termination,
        complete: bool,
        rounds_executed: usize,
        duration_ms: u64,
    },
}

impl CouncilEvent {
    /// Event type identifier, matching the serialized `type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            CouncilEvent::InvestigationStarted { .. } => "investigation_started",
            CouncilEvent::StateTransition { .. } => "state_transition",
            CouncilEvent::WorkerCompleted { .. } => "worker_completed",
            CouncilEvent::CriticCompleted { .. } => "critic_completed",
            CouncilEvent::RoundSynthesized { .. } => "round_synthesized",
            CouncilEvent::InvestigationFinished { .. } => "investigation_finished",
        }
    }

    pub fn investigation_id(&self) -> &str {
        match self {
            CouncilEvent::InvestigationStarted { investigation_id, .. }
            | CouncilEvent::StateTransition { investigation_id, .. }
            | CouncilEvent::WorkerCompleted { investigation_id, .. }
            | CouncilEvent::CriticCompleted { investigation_id, .. }
            | CouncilEvent::RoundSynthesized { investigation_id, .. }
            | CouncilEvent::InvestigationFinished { investigation_id, .. } => investigation_id,
        }
    }
}

/// Fire-and-forget consumer of council events
pub trait TelemetrySink: Send + Sync {
    fn emit(&self, event: &CouncilEvent);
}

/// No-op sink for tests and when telemetry is disabled
pub struct NoTelemetry;

impl TelemetrySink for NoTelemetry {
    fn emit(&self, _event: &CouncilEvent) {}
}

/// Fans every event out to several sinks, in order.
///
/// ```text
/// RunCouncilUseCase ──emit──▶ CompositeTelemetry
///                                  ├──▶ JsonlTelemetrySink   (dashboard feed)
///                                  └──▶ ProgressReporter     (terminal)
/// ```
#[derive(Default)]
pub struct CompositeTelemetry {
    sinks: Vec<std::sync::Arc<dyn TelemetrySink>>,
}

impl CompositeTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: std::sync::Arc<dyn TelemetrySink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl TelemetrySink for CompositeTelemetry {
    fn emit(&self, event: &CouncilEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}
