//! Critic reports for debate rounds.

use super::finding::WorkerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One observation from the critic, pointing at the findings it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CritiqueItem {
    /// Workers whose findings this item refers to
    pub workers: Vec<WorkerId>,
    pub note: String,
}

impl CritiqueItem {
    pub fn new(workers: Vec<WorkerId>, note: impl Into<String>) -> Self {
        Self {
            workers,
            note: note.into(),
        }
    }

    /// Whether this item mentions the given worker
    pub fn concerns(&self, worker: &WorkerId) -> bool {
        self.workers.contains(worker)
    }
}

/// Cross-examination of one round's findings. Immutable once published.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriticReport {
    /// Debate round this report was produced in (1-indexed, round 0 has none)
    pub round: usize,
    #[serde(default)]
    pub agreements: Vec<CritiqueItem>,
    #[serde(default)]
    pub contradictions: Vec<CritiqueItem>,
    #[serde(default)]
    pub gaps: Vec<CritiqueItem>,
    /// Set when the critic failed and this report is an empty stand-in.
    /// Records whether it timed out, errored, or returned malformed output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl CriticReport {
    pub fn new(round: usize) -> Self {
        Self {
            round,
            ..Default::default()
        }
    }

    /// Empty report substituted when the critic fails.
    pub fn failed(round: usize, reason: impl Into<String>) -> Self {
        Self {
            round,
            failure: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.agreements.is_empty() && self.contradictions.is_empty() && self.gaps.is_empty()
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Drop references to workers that were not dispatched, and any item left
    /// with no references at all.
    pub fn retain_known(mut self, known: &BTreeSet<WorkerId>) -> Self {
        for list in [
            &mut self.agreements,
            &mut self.contradictions,
            &mut self.gaps,
        ] {
            for item in list.iter_mut() {
                item.workers.retain(|w| known.contains(w));
            }
            list.retain(|item| !item.workers.is_empty());
        }
        self
    }

    /// Items of every kind that concern one worker, labelled by kind.
    /// Used to build that worker's feedback for the next round.
    pub fn feedback_for(&self, worker: &WorkerId) -> Vec<(&'static str, &str)> {
        let mut out = Vec::new();
        for (label, list) in [
            ("agreement", &self.agreements),
            ("contradiction", &self.contradictions),
            ("gap", &self.gaps),
        ] {
            out.extend(
                list.iter()
                    .filter(|item| item.concerns(worker))
                    .map(|item| (label, item.note.as_str())),
            );
        }
        out
    }
}
