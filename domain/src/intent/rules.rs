//! Keyword rule set for intent classification.
//!
//! All vocabulary is matched on word boundaries against the normalized query
//! (lowercase, punctuation folded to spaces), so `"p1"` matches `"P1 outage"`
//! but not `"ip1"`. Phrases may span several words.

use crate::investigation::mode::SignalDomain;
use std::collections::BTreeMap;

/// Default maximum length (in characters) for a query to qualify as Fast.
pub const DEFAULT_FAST_LENGTH_THRESHOLD: usize = 100;

/// Rule set consulted by [`super::IntentClassifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct IntentRules {
    /// Queries at or above this many characters are never Fast
    pub fast_length_threshold: usize,
    /// Health / status / quick-check vocabulary
    pub fast_vocabulary: Vec<String>,
    /// Severity / urgency vocabulary that forces Debate
    pub debate_vocabulary: Vec<String>,
    /// Keywords used to pick the primary signal domain
    pub signal_keywords: BTreeMap<SignalDomain, Vec<String>>,
    /// Primary signal when no domain keyword matches
    pub default_signal: SignalDomain,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for IntentRules {
    fn default() -> Self {
        let mut signal_keywords = BTreeMap::new();
        signal_keywords.insert(
            SignalDomain::Alerts,
            words(&[
                "alert", "alerts", "alerting", "firing", "fired", "pager", "paged", "page",
                "pagerduty", "oncall", "on call", "alarm", "alarms", "silenced",
            ]),
        );
        signal_keywords.insert(
            SignalDomain::Metrics,
            words(&[
                "metric", "metrics", "cpu", "memory", "latency", "throughput", "p99", "p95",
                "rps", "qps", "saturation", "utilization", "dashboard", "gauge", "load",
                "error rate", "prometheus",
            ]),
        );
        signal_keywords.insert(
            SignalDomain::Logs,
            words(&[
                "log", "logs", "logging", "exception", "exceptions", "stack trace",
                "stacktrace", "panic", "error message", "errors", "5xx", "500", "warn",
            ]),
        );
        signal_keywords.insert(
            SignalDomain::Traces,
            words(&[
                "trace", "traces", "tracing", "span", "spans", "jaeger", "tempo",
                "call graph", "upstream", "downstream", "dependency", "dependencies",
            ]),
        );
        signal_keywords.insert(
            SignalDomain::Sql,
            words(&[
                "sql", "database", "db", "postgres", "postgresql", "mysql", "deadlock",
                "slow query", "index", "table", "replication", "replica", "connection pool",
            ]),
        );

        Self {
            fast_length_threshold: DEFAULT_FAST_LENGTH_THRESHOLD,
            fast_vocabulary: words(&[
                "health", "healthy", "status", "quick", "check", "up", "alive", "ok", "okay",
                "running", "ping", "sanity",
            ]),
            debate_vocabulary: words(&[
                "root cause", "rca", "outage", "p0", "p1", "sev0", "sev1", "postmortem",
                "post mortem", "major incident",
            ]),
            signal_keywords,
            default_signal: SignalDomain::Alerts,
        }
    }
}

impl IntentRules {
    pub fn with_fast_length_threshold(mut self, threshold: usize) -> Self {
        self.fast_length_threshold = threshold;
        self
    }

    /// Append extra keywords for one signal domain
    pub fn with_extra_keywords<I, S>(mut self, domain: SignalDomain, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signal_keywords
            .entry(domain)
            .or_default()
            .extend(keywords.into_iter().map(Into::into));
        self
    }

    pub fn with_default_signal(mut self, domain: SignalDomain) -> Self {
        self.default_signal = domain;
        self
    }
}
