//! Prompt templates for the council flow

use crate::investigation::context::RoundContext;
use crate::investigation::critique::{CriticReport, CritiqueItem};
use crate::investigation::finding::{Finding, WorkerId};
use crate::investigation::mode::SignalDomain;
use std::collections::BTreeMap;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for a specialist worker
    pub fn worker_system(domain: SignalDomain) -> String {
        format!(
            r#"You are an SRE specialist for the {} signal domain, taking part in an incident investigation council.
Interpret the telemetry you are given and assess only what it supports.
Answer with a single JSON object:
{{"summary": string, "severity": "critical"|"warning"|"info"|"healthy", "confidence": number between 0 and 1, "evidence": [string], "recommended_actions": [string]}}
Keep evidence entries short and concrete (values, timestamps, identifiers)."#,
            domain.display_name()
        )
    }

    /// User prompt for a specialist worker
    ///
    /// `tool_outputs` are `(tool_name, output_or_failure_note)` pairs.
    pub fn worker_prompt(
        ctx: &RoundContext,
        worker: &WorkerId,
        tool_outputs: &[(String, String)],
    ) -> String {
        let mut prompt = format!("Investigation query: {}\n", ctx.query);

        if let Some(session) = &ctx.session_context {
            prompt.push_str(&format!("\nSession context:\n{}\n", session));
        }

        if tool_outputs.is_empty() {
            prompt.push_str("\nNo telemetry tools are configured for your domain.\n");
        } else {
            prompt.push_str("\nTelemetry:\n");
            for (tool, output) in tool_outputs {
                prompt.push_str(&format!("\n--- {} ---\n{}\n", tool, output));
            }
        }

        if let Some(previous) = ctx.prior_finding_of(worker) {
            prompt.push_str(&format!(
                "\nYour previous finding (round {}):\n{}\n",
                ctx.round.saturating_sub(1),
                Self::render_finding(previous)
            ));
        }

        if let Some(report) = &ctx.critic_report {
            let feedback = report.feedback_for(worker);
            if feedback.is_empty() {
                prompt.push_str("\nThe critic raised no points about your finding.\n");
            } else {
                prompt.push_str("\nCritic feedback on your finding:\n");
                for (kind, note) in feedback {
                    prompt.push_str(&format!("- [{}] {}\n", kind, note));
                }
                prompt.push_str("Revise your assessment where the feedback is justified.\n");
            }
        }

        prompt.push_str("\nRespond with the JSON object only.");
        prompt
    }

    /// System prompt for the critic
    pub fn critic_system() -> &'static str {
        r#"You are a skeptical incident reviewer cross-examining findings from several telemetry specialists.
Identify where findings corroborate each other, where they contradict each other, and what evidence is missing.
Refer to findings only by the worker identifiers given.
Answer with a single JSON object:
{"agreements": [{"workers": [string], "note": string}], "contradictions": [{"workers": [string], "note": string}], "gaps": [{"workers": [string], "note": string}]}"#
    }

    /// User prompt for the critic
    pub fn critic_prompt(query: &str, findings: &BTreeMap<WorkerId, Finding>) -> String {
        let mut prompt = format!("Investigation query: {}\n\nFindings:\n", query);
        for (worker, finding) in findings {
            prompt.push_str(&format!(
                "\n--- {} ---\n{}\n",
                worker,
                Self::render_finding(finding)
            ));
        }
        prompt.push_str("\nRespond with the JSON object only.");
        prompt
    }

    /// System prompt for the synthesizer
    pub fn synthesis_system() -> &'static str {
        r#"You are the incident commander merging specialist findings into one assessment.
Weigh corroborated evidence above isolated claims and ignore placeholders from failed workers.
State your overall confidence honestly: it must not exceed the strongest individual finding unless independent signals agree.
Answer with a single JSON object:
{"confidence": number between 0 and 1, "summary": string}"#
    }

    /// User prompt for the synthesizer
    pub fn synthesis_prompt(
        query: &str,
        findings: &BTreeMap<WorkerId, Finding>,
        critic: Option<&CriticReport>,
    ) -> String {
        let mut prompt = format!("Investigation query: {}\n\nFindings:\n", query);
        for (worker, finding) in findings {
            prompt.push_str(&format!(
                "\n--- {} ---\n{}\n",
                worker,
                Self::render_finding(finding)
            ));
        }

        if let Some(report) = critic.filter(|r| !r.is_empty()) {
            prompt.push_str("\nCritic report:\n");
            for (label, items) in [
                ("Agreements", &report.agreements),
                ("Contradictions", &report.contradictions),
                ("Gaps", &report.gaps),
            ] {
                if !items.is_empty() {
                    prompt.push_str(&format!("{}:\n", label));
                    for item in items {
                        prompt.push_str(&format!("- {}\n", Self::render_item(item)));
                    }
                }
            }
        }

        prompt.push_str("\nRespond with the JSON object only.");
        prompt
    }

    fn render_finding(finding: &Finding) -> String {
        if finding.is_degraded() {
            return format!(
                "(unavailable) {}",
                finding.evidence.first().map_or("no details", |e| e.as_str())
            );
        }
        let mut out = format!(
            "severity: {}\nconfidence: {:.2}\nsummary: {}",
            finding.severity, finding.confidence, finding.summary
        );
        if !finding.evidence.is_empty() {
            out.push_str("\nevidence:");
            for item in &finding.evidence {
                out.push_str(&format!("\n  - {}", item));
            }
        }
        out
    }

    fn render_item(item: &CritiqueItem) -> String {
        let workers = item
            .workers
            .iter()
            .map(|w| w.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!("[{}] {}", workers, item.note)
    }
}
