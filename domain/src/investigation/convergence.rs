//! Convergence tracking for the debate loop.
//!
//! Pure bookkeeping: the orchestrator records each synthesized round here and
//! asks whether to stop. Nothing in this module performs I/O or reads clocks;
//! durations are measured by the caller and passed in.

use super::critique::CriticReport;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an investigation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Fast/Standard mode: round 0 only, debate loop never entered
    SinglePass,
    /// Overall confidence reached the threshold
    ConfidenceReached,
    /// `max_rounds` debate rounds were executed
    RoundLimit,
    /// Pipeline budget elapsed before a terminal state
    PipelineTimeout,
    /// The caller cancelled the investigation
    Cancelled,
    /// A synthesis failed; the previous round's result was kept.
    /// Always leaves the result with `complete = false`.
    SynthesisFailed,
}

impl Termination {
    /// Whether this termination leaves the result marked `complete`
    pub fn is_complete(&self) -> bool {
        matches!(
            self,
            Termination::SinglePass | Termination::ConfidenceReached | Termination::RoundLimit
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::SinglePass => "single_pass",
            Termination::ConfidenceReached => "confidence_reached",
            Termination::RoundLimit => "round_limit",
            Termination::PipelineTimeout => "pipeline_timeout",
            Termination::Cancelled => "cancelled",
            Termination::SynthesisFailed => "synthesis_failed",
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bookkeeping for one synthesized round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// 0 for the initial pass, 1.. for debate rounds
    pub round: usize,
    pub confidence: f64,
    /// Change from the previous round; `None` for round 0
    pub confidence_delta: Option<f64>,
    pub critic_gaps: usize,
    pub critic_contradictions: usize,
    pub duration_ms: u64,
}

/// Confidence gate plus per-round history.
#[derive(Debug, Clone)]
pub struct ConvergenceTracker {
    confidence_threshold: f64,
    max_rounds: usize,
    records: Vec<RoundRecord>,
}

impl ConvergenceTracker {
    pub fn new(confidence_threshold: f64, max_rounds: usize) -> Self {
        Self {
            confidence_threshold,
            max_rounds,
            records: Vec::new(),
        }
    }

    /// Record a synthesized round. Rounds must be recorded in order.
    pub fn record(
        &mut self,
        round: usize,
        confidence: f64,
        critic: Option<&CriticReport>,
        duration_ms: u64,
    ) -> &RoundRecord {
        let confidence_delta = self.records.last().map(|prev| confidence - prev.confidence);
        self.records.push(RoundRecord {
            round,
            confidence,
            confidence_delta,
            critic_gaps: critic.map_or(0, |c| c.gaps.len()),
            critic_contradictions: critic.map_or(0, |c| c.contradictions.len()),
            duration_ms,
        });
        &self.records[self.records.len() - 1]
    }

    /// Stop condition evaluated after each round's synthesis.
    ///
    /// Confidence is checked first so a round that both reaches the threshold
    /// and exhausts the round budget reports `ConfidenceReached`.
    pub fn should_stop(&self, confidence: f64, rounds_executed: usize) -> Option<Termination> {
        if confidence >= self.confidence_threshold {
            Some(Termination::ConfidenceReached)
        } else if rounds_executed >= self.max_rounds {
            Some(Termination::RoundLimit)
        } else {
            None
        }
    }

    pub fn records(&self) -> &[RoundRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<RoundRecord> {
        self.records
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::investigation::critique::CritiqueItem;
    use crate::investigation::finding::WorkerId;

    #[test]
    fn test_stops_on_confidence() {
        let tracker = ConvergenceTracker::new(0.85, 3);
        assert_eq!(tracker.should_stop(0.9, 1), Some(Termination::ConfidenceReached));
        assert_eq!(tracker.should_stop(0.85, 0), Some(Termination::ConfidenceReached));
        assert_eq!(tracker.should_stop(0.5, 1), None);
    }

    #[test]
    fn test_stops_on_round_limit() {
        let tracker = ConvergenceTracker::new(0.85, 3);
        assert_eq!(tracker.should_stop(0.5, 2), None);
        assert_eq!(tracker.should_stop(0.5, 3), Some(Termination::RoundLimit));
    }

    #[test]
    fn test_confidence_wins_over_round_limit() {
        let tracker = ConvergenceTracker::new(0.85, 2);
        assert_eq!(tracker.should_stop(0.95, 2), Some(Termination::ConfidenceReached));
    }

    #[test]
    fn test_record_computes_delta_and_critic_counts() {
        let mut tracker = ConvergenceTracker::new(0.85, 3);
        tracker.record(0, 0.5, None, 120);

        let mut report = CriticReport::new(1);
        report
            .gaps
            .push(CritiqueItem::new(vec![WorkerId::new("logs")], "no logs for db"));
        let record = tracker.record(1, 0.7, Some(&report), 80).clone();

        assert_eq!(tracker.records()[0].confidence_delta, None);
        assert!((record.confidence_delta.unwrap() - 0.2).abs() < 1e-9);
        assert_eq!(record.critic_gaps, 1);
        assert_eq!(record.critic_contradictions, 0);
        assert_eq!(record.duration_ms, 80);
    }

    #[test]
    fn test_termination_completeness() {
        assert!(Termination::RoundLimit.is_complete());
        assert!(Termination::SinglePass.is_complete());
        assert!(!Termination::PipelineTimeout.is_complete());
        assert!(!Termination::SynthesisFailed.is_complete());
    }
}
