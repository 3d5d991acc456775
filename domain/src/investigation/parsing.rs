//! Response parsing for worker, critic, and synthesizer replies.
//!
//! The reasoning engine is asked to answer with a JSON object, but replies
//! often wrap it in prose or a markdown code fence. These functions locate the
//! outermost `{ ... }` span, deserialize it leniently, and validate the result.
//! They are pure domain logic: no I/O, no retries.
//!
//! | Function | Expected keys |
//! |----------|---------------|
//! | [`parse_finding`] | `summary`, `severity`, `confidence`, `evidence`, `recommended_actions` |
//! | [`parse_critic_report`] | `agreements`, `contradictions`, `gaps` (each `[{workers, note}]`) |
//! | [`parse_synthesis`] | `confidence`, `summary` |

use super::critique::{CriticReport, CritiqueItem};
use super::finding::{Finding, Severity, WorkerId, clamp_confidence};
use crate::core::error::DomainError;
use serde::Deserialize;

/// Slice of `response` from the first `{` to the last `}` inclusive.
pub fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response[start..].rfind('}')?;
    Some(&response[start..start + end + 1])
}

fn parse_object<T: for<'de> Deserialize<'de>>(response: &str) -> Result<T, DomainError> {
    let json = extract_json_object(response)
        .ok_or_else(|| DomainError::MalformedResponse("no JSON object found".to_string()))?;
    serde_json::from_str(json).map_err(|e| DomainError::MalformedResponse(e.to_string()))
}

#[derive(Deserialize)]
struct RawFinding {
    summary: String,
    severity: String,
    confidence: f64,
    #[serde(default)]
    evidence: Vec<String>,
    #[serde(default, alias = "recommendedActions", alias = "actions")]
    recommended_actions: Vec<String>,
}

/// Parse a specialist worker's reply into a [`Finding`].
///
/// # Examples
///
/// ```
/// use council_domain::investigation::parsing::parse_finding;
/// use council_domain::Severity;
///
/// let reply = r#"Here you go:
/// {"summary": "p99 latency doubled", "severity": "warning", "confidence": 0.7,
///  "evidence": ["p99=840ms"], "recommended_actions": ["scale api pool"]}"#;
/// let finding = parse_finding(reply).unwrap();
/// assert_eq!(finding.severity, Severity::Warning);
/// assert_eq!(finding.evidence, vec!["p99=840ms"]);
/// ```
pub fn parse_finding(response: &str) -> Result<Finding, DomainError> {
    let raw: RawFinding = parse_object(response)?;

    if raw.summary.trim().is_empty() {
        return Err(DomainError::MalformedResponse("empty summary".to_string()));
    }
    let severity = raw
        .severity
        .parse::<Severity>()
        .map_err(DomainError::MalformedResponse)?;

    Ok(Finding {
        summary: raw.summary.trim().to_string(),
        severity,
        confidence: clamp_confidence(raw.confidence),
        evidence: raw.evidence,
        recommended_actions: raw.recommended_actions,
        degraded: false,
    })
}

#[derive(Deserialize)]
struct RawCritiqueItem {
    #[serde(default, alias = "findings")]
    workers: Vec<String>,
    #[serde(default, alias = "detail", alias = "description")]
    note: String,
}

#[derive(Deserialize)]
struct RawCriticReport {
    #[serde(default)]
    agreements: Vec<RawCritiqueItem>,
    #[serde(default)]
    contradictions: Vec<RawCritiqueItem>,
    #[serde(default)]
    gaps: Vec<RawCritiqueItem>,
}

fn convert_items(items: Vec<RawCritiqueItem>) -> Vec<CritiqueItem> {
    items
        .into_iter()
        .map(|item| {
            CritiqueItem::new(
                item.workers.into_iter().map(WorkerId::new).collect(),
                item.note,
            )
        })
        .collect()
}

/// Parse a critic reply into a [`CriticReport`] for the given round.
///
/// Worker references are kept as given; callers filter them against the
/// dispatched set with [`CriticReport::retain_known`].
pub fn parse_critic_report(response: &str, round: usize) -> Result<CriticReport, DomainError> {
    let raw: RawCriticReport = parse_object(response)?;
    Ok(CriticReport {
        round,
        agreements: convert_items(raw.agreements),
        contradictions: convert_items(raw.contradictions),
        gaps: convert_items(raw.gaps),
        failure: None,
    })
}

#[derive(Deserialize)]
struct RawSynthesis {
    confidence: f64,
    #[serde(default, alias = "synthesis", alias = "text")]
    summary: String,
}

/// Parse a synthesizer reply into `(proposed_confidence, text)`.
///
/// The confidence is returned unbounded; the caller applies the evidence
/// ceiling.
pub fn parse_synthesis(response: &str) -> Result<(f64, String), DomainError> {
    let raw: RawSynthesis = parse_object(response)?;
    if raw.confidence.is_nan() {
        return Err(DomainError::MalformedResponse(
            "confidence is not a number".to_string(),
        ));
    }
    Ok((raw.confidence, raw.summary.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_code_fence() {
        let response = "```json\n{\"a\": 1}\n```";
        assert_eq!(extract_json_object(response), Some("{\"a\": 1}"));
        assert_eq!(extract_json_object("no braces"), None);
    }

    #[test]
    fn test_parse_finding_accepts_camel_case_actions() {
        let response = r#"{"summary": "disk full", "severity": "critical", "confidence": 0.9,
            "recommendedActions": ["expand volume"]}"#;
        let finding = parse_finding(response).unwrap();
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(finding.recommended_actions, vec!["expand volume"]);
        assert!(finding.evidence.is_empty());
    }

    #[test]
    fn test_parse_finding_clamps_confidence() {
        let response = r#"{"summary": "x", "severity": "info", "confidence": 3.0}"#;
        assert_eq!(parse_finding(response).unwrap().confidence, 1.0);
    }

    #[test]
    fn test_parse_finding_rejects_unknown_severity() {
        let response = r#"{"summary": "x", "severity": "apocalyptic", "confidence": 0.5}"#;
        assert!(parse_finding(response).is_err());
    }

    #[test]
    fn test_parse_finding_rejects_prose() {
        assert!(parse_finding("Everything looks fine to me.").is_err());
    }

    #[test]
    fn test_parse_critic_report() {
        let response = r#"Critique:
{"agreements": [{"workers": ["logs", "metrics"], "note": "both show 5xx at 14:02"}],
 "contradictions": [],
 "gaps": [{"workers": ["traces"], "note": "no spans for payment-svc"}]}"#;
        let report = parse_critic_report(response, 2).unwrap();

        assert_eq!(report.round, 2);
        assert_eq!(report.agreements.len(), 1);
        assert_eq!(report.agreements[0].workers.len(), 2);
        assert!(report.contradictions.is_empty());
        assert_eq!(report.gaps[0].note, "no spans for payment-svc");
        assert!(!report.is_failed());
    }

    #[test]
    fn test_parse_critic_report_missing_sections_default_empty() {
        let report = parse_critic_report("{}", 1).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_parse_synthesis() {
        let (confidence, text) =
            parse_synthesis(r#"{"confidence": 0.82, "summary": " DB pool exhausted "}"#).unwrap();
        assert!((confidence - 0.82).abs() < 1e-9);
        assert_eq!(text, "DB pool exhausted");
        assert!(parse_synthesis(r#"{"summary": "no confidence"}"#).is_err());
    }
}
