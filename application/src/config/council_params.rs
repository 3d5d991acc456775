//! Council parameters: debate loop control.
//!
//! [`CouncilParams`] groups the static parameters that control the
//! orchestration loop in [`RunCouncilUseCase`](crate::use_cases::run_council::RunCouncilUseCase).
//! These are application-layer concerns, not domain policy.

use council_domain::investigation::aggregation::DEFAULT_AGREEMENT_BONUS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest pipeline budget accepted from configuration or the command line.
pub const MAX_PIPELINE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Upper bound on `max_rounds` accepted from configuration.
pub const MAX_DEBATE_ROUNDS: usize = 100;

/// Loop control parameters for one investigation.
///
/// | Field | Default | Used by |
/// |-------|---------|---------|
/// | `max_rounds` | 3 | Debate loop round limit |
/// | `confidence_threshold` | 0.85 | Debate loop confidence gate |
/// | `pipeline_timeout` | 120s | Whole investigation |
/// | `worker_timeout` | none | Cap on the per-stage budget |
/// | `agreement_bonus` | 0.05 | Synthesis confidence ceiling |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouncilParams {
    /// Maximum number of debate rounds after round 0.
    pub max_rounds: usize,
    /// Overall confidence at which the debate loop stops early.
    pub confidence_threshold: f64,
    /// Budget for the whole investigation, round 0 included.
    pub pipeline_timeout: Duration,
    /// Upper bound for a single worker, critic, or synthesis call.
    pub worker_timeout: Option<Duration>,
    /// Confidence allowed above the best finding when signals corroborate.
    pub agreement_bonus: f64,
}

impl Default for CouncilParams {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            confidence_threshold: 0.85,
            pipeline_timeout: Duration::from_secs(120),
            worker_timeout: None,
            agreement_bonus: DEFAULT_AGREEMENT_BONUS,
        }
    }
}

impl CouncilParams {
    // ==================== Builder Methods ====================

    pub fn with_max_rounds(mut self, max: usize) -> Self {
        self.max_rounds = max;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_pipeline_timeout(mut self, timeout: Duration) -> Self {
        self.pipeline_timeout = timeout;
        self
    }

    pub fn with_worker_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.worker_timeout = timeout;
        self
    }

    pub fn with_agreement_bonus(mut self, bonus: f64) -> Self {
        self.agreement_bonus = bonus;
        self
    }

    // ==================== Budget ====================

    /// Instant at which the pipeline budget runs out, starting from `start`.
    ///
    /// Budgets too large to represent are capped at [`MAX_PIPELINE_TIMEOUT`].
    pub fn deadline_from(&self, start: tokio::time::Instant) -> tokio::time::Instant {
        start
            .checked_add(self.pipeline_timeout)
            .unwrap_or(start + MAX_PIPELINE_TIMEOUT)
    }

    /// Budget for one stage (a worker call, the critic, or the synthesizer).
    ///
    /// The remaining pipeline budget is split evenly over the rounds still to
    /// run (`rounds_left`, at least 1), then capped by `worker_timeout`.
    pub fn stage_budget(&self, remaining: Duration, rounds_left: usize) -> Duration {
        let divisor = u32::try_from(rounds_left).unwrap_or(u32::MAX).max(1);
        let share = remaining / divisor;
        match self.worker_timeout {
            Some(cap) => share.min(cap),
            None => share,
        }
    }
}
