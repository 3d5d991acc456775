//! Intent classifier: picks an investigation mode and primary signal.
//!
//! Pure and deterministic. The same query text and rule set always yield the
//! same [`Intent`]. Precedence is Debate > Fast > Standard, so a query that
//! mentions an outage is never downgraded because it is also short.

use super::rules::IntentRules;
use crate::core::query::Query;
use crate::investigation::mode::{InvestigationMode, SignalDomain};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Causal questions about a failure ("why is checkout failing").
static CAUSAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\bwhy\s+(?:is|are|does|do|did|was|were|has|have|would)\b.*\b(?:fail\w*|down|slow\w*|error\w*|crash\w*|broken|timing out|time out|spik\w*|degrad\w*|unavailable|flak\w*|dropping|stuck)\b|\bwhat\s+caused\b",
    )
    .expect("causal pattern is a valid regex")
});

/// Result of classifying a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub mode: InvestigationMode,
    pub primary_signal: SignalDomain,
}

#[derive(Debug, Clone, Default)]
pub struct IntentClassifier {
    rules: IntentRules,
}

impl IntentClassifier {
    pub fn new(rules: IntentRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &IntentRules {
        &self.rules
    }

    /// Classify a query into `(mode, primary_signal)`.
    pub fn classify(&self, query: &Query) -> Intent {
        let text = fold(query.text());
        Intent {
            mode: self.select_mode(query, &text),
            primary_signal: self.select_signal(&text),
        }
    }

    fn select_mode(&self, query: &Query, text: &str) -> InvestigationMode {
        if self.is_debate(text) {
            return InvestigationMode::Debate;
        }
        let length = query.text().trim().chars().count();
        if length < self.rules.fast_length_threshold
            && contains_any(text, &self.rules.fast_vocabulary)
        {
            return InvestigationMode::Fast;
        }
        InvestigationMode::Standard
    }

    fn is_debate(&self, text: &str) -> bool {
        contains_any(text, &self.rules.debate_vocabulary) || CAUSAL_PATTERN.is_match(text)
    }

    /// Domain with the most distinct keyword hits. Ties go to the domain
    /// declared first in [`SignalDomain`].
    fn select_signal(&self, text: &str) -> SignalDomain {
        let mut best: Option<(SignalDomain, usize)> = None;
        for (domain, keywords) in &self.rules.signal_keywords {
            let score = keywords.iter().filter(|k| contains_phrase(text, k)).count();
            if score == 0 {
                continue;
            }
            // BTreeMap iterates in priority order, so only a strictly higher
            // score replaces the current best.
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((*domain, score));
            }
        }
        best.map_or(self.rules.default_signal, |(domain, _)| domain)
    }
}

/// Lowercase, fold every non-alphanumeric run into one space, and pad with
/// spaces so phrase matching can rely on word boundaries.
fn fold(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    format!(" {} ", folded.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn contains_phrase(folded_text: &str, phrase: &str) -> bool {
    let needle = fold(phrase);
    !needle.trim().is_empty() && folded_text.contains(&needle)
}

fn contains_any(folded_text: &str, phrases: &[String]) -> bool {
    phrases.iter().any(|p| contains_phrase(folded_text, p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Intent {
        IntentClassifier::default().classify(&Query::new(text))
    }

    #[test]
    fn test_short_health_check_is_fast() {
        let intent = classify("Is the alerting pipeline healthy?");
        assert_eq!(intent.mode, InvestigationMode::Fast);
        assert_eq!(intent.primary_signal, SignalDomain::Alerts);
    }

    #[test]
    fn test_fast_picks_best_matching_signal() {
        let intent = classify("quick check on api latency and cpu");
        assert_eq!(intent.mode, InvestigationMode::Fast);
        assert_eq!(intent.primary_signal, SignalDomain::Metrics);
    }

    #[test]
    fn test_long_health_query_is_standard() {
        let text = "Can you check the status of every service in the eu-west cluster and tell me \
                    whether anything looks unusual compared with last week?";
        assert!(text.len() >= 100);
        assert_eq!(classify(text).mode, InvestigationMode::Standard);
    }

    #[test]
    fn test_urgency_vocabulary_is_debate() {
        assert_eq!(classify("root cause for the payments outage").mode, InvestigationMode::Debate);
        assert_eq!(classify("P1: checkout 500s").mode, InvestigationMode::Debate);
        assert_eq!(classify("draft the post-mortem").mode, InvestigationMode::Debate);
    }

    #[test]
    fn test_causal_question_is_debate() {
        let intent = classify("why is the orders db failing");
        assert_eq!(intent.mode, InvestigationMode::Debate);
        assert_eq!(intent.primary_signal, SignalDomain::Sql);
    }

    #[test]
    fn test_debate_beats_fast() {
        // Short, contains "status", but also "outage".
        assert_eq!(classify("status of the outage?").mode, InvestigationMode::Debate);
    }

    #[test]
    fn test_word_boundaries() {
        // "ip1" must not trigger "p1"; "update" must not trigger "up".
        assert_eq!(
            classify("summarize ip1 address allocation update for the network team").mode,
            InvestigationMode::Standard
        );
    }

    #[test]
    fn test_everything_else_is_standard() {
        let intent = classify("summarize what changed in the traces for the search service");
        assert_eq!(intent.mode, InvestigationMode::Standard);
        assert_eq!(intent.primary_signal, SignalDomain::Traces);
    }

    #[test]
    fn test_no_keywords_uses_default_signal() {
        assert_eq!(classify("hello there").primary_signal, SignalDomain::Alerts);
        let classifier =
            IntentClassifier::new(IntentRules::default().with_default_signal(SignalDomain::Logs));
        assert_eq!(
            classifier.classify(&Query::new("hello there")).primary_signal,
            SignalDomain::Logs
        );
    }

    #[test]
    fn test_tie_broken_by_domain_priority() {
        // One metrics hit ("cpu"), one logs hit ("exception").
        assert_eq!(
            classify("cpu exception summary").primary_signal,
            SignalDomain::Metrics
        );
    }

    #[test]
    fn test_classification_is_idempotent() {
        let classifier = IntentClassifier::default();
        let query = Query::new("Why is the checkout service timing out since the deploy?");
        let first = classifier.classify(&query);
        for _ in 0..10 {
            assert_eq!(classifier.classify(&query), first);
        }
    }

    #[test]
    fn test_fast_threshold_configurable() {
        let classifier =
            IntentClassifier::new(IntentRules::default().with_fast_length_threshold(10));
        assert_eq!(
            classifier.classify(&Query::new("is db healthy")).mode,
            InvestigationMode::Standard
        );
    }
}
