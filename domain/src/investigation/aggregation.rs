//! Aggregation policy for merging findings.
//!
//! Severity is decided by rule, not by the reasoning engine: the overall
//! severity is the maximum over non-degraded findings. Confidence is the
//! engine's judgment, but it is clamped into [`confidence_ceiling`] so it can
//! never exceed what the evidence supports.

use super::critique::CriticReport;
use super::finding::{Finding, Severity, WorkerId};
use std::collections::BTreeMap;

/// Default bonus allowed above the best individual confidence when signals agree.
pub const DEFAULT_AGREEMENT_BONUS: f64 = 0.05;

/// Maximum severity across non-degraded findings; `Info` if there are none.
pub fn overall_severity(findings: &BTreeMap<WorkerId, Finding>) -> Severity {
    findings
        .values()
        .filter(|f| !f.is_degraded())
        .map(|f| f.severity)
        .max()
        .unwrap_or(Severity::Info)
}

/// Whether independent signals corroborate each other.
///
/// True when the critic reported at least one agreement, or when two or more
/// non-degraded findings reached the same severity as the overall assessment.
pub fn has_cross_signal_agreement(
    findings: &BTreeMap<WorkerId, Finding>,
    critic: Option<&CriticReport>,
) -> bool {
    if critic.is_some_and(|c| !c.agreements.is_empty()) {
        return true;
    }
    let overall = overall_severity(findings);
    findings
        .values()
        .filter(|f| !f.is_degraded() && f.severity == overall)
        .count()
        >= 2
}

/// Upper bound for overall confidence given the evidence.
///
/// The best non-degraded finding's confidence, plus `agreement_bonus` when
/// signals agree, capped at 1.0. Zero when there is no usable evidence, so a
/// confidence can never be fabricated from nothing.
pub fn confidence_ceiling(
    findings: &BTreeMap<WorkerId, Finding>,
    critic: Option<&CriticReport>,
    agreement_bonus: f64,
) -> f64 {
    let best = findings
        .values()
        .filter(|f| !f.is_degraded())
        .map(|f| f.confidence)
        .fold(0.0_f64, f64::max);

    if best <= 0.0 {
        return 0.0;
    }

    let bonus = if has_cross_signal_agreement(findings, critic) {
        agreement_bonus.max(0.0)
    } else {
        0.0
    };
    (best + bonus).min(1.0)
}

/// Clamp an engine-proposed confidence into `0.0..=ceiling`.
pub fn bound_confidence(proposed: f64, ceiling: f64) -> f64 {
    if proposed.is_nan() {
        return 0.0;
    }
    proposed.clamp(0.0, ceiling.max(0.0))
}
