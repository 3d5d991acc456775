//! Console output formatter for council results

use crate::output::formatter::OutputFormatter;
use colored::{ColoredString, Colorize};
use council_domain::{CouncilResult, CritiqueItem, Intent, Query, Severity};

/// Formats council results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete council result
    pub fn format(result: &CouncilResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Signal Council Report"));
        output.push('\n');

        output.push_str(&format!("{} {}\n", "Query:".cyan().bold(), result.query));
        output.push_str(&format!(
            "{} {} (primary signal: {})\n",
            "Mode:".cyan().bold(),
            result.mode,
            result.primary_signal
        ));
        output.push_str(&format!(
            "{} {}\n\n",
            "Investigation:".cyan().bold(),
            result.investigation_id
        ));

        output.push_str(&Self::section_header("Findings"));
        for (worker, finding) in &result.findings {
            let title = format!("── {} ──", worker);
            if finding.is_degraded() {
                output.push_str(&format!("\n{}\n{}\n", title.red().bold(), finding.summary));
            } else {
                output.push_str(&format!(
                    "\n{} {} {}\n{}\n",
                    title.yellow().bold(),
                    Self::severity(finding.severity),
                    format!("({:.2})", finding.confidence).dimmed(),
                    finding.summary
                ));
            }
            for item in &finding.evidence {
                output.push_str(&format!("  - {}\n", item));
            }
            for action in &finding.recommended_actions {
                output.push_str(&format!("  {} {}\n", "->".green(), action));
            }
        }

        if !result.critic_reports.is_empty() {
            output.push_str(&Self::section_header("Critiques"));
            for report in &result.critic_reports {
                output.push_str(&format!(
                    "\n{}\n",
                    format!("── Round {} ──", report.round).yellow().bold()
                ));
                if let Some(failure) = &report.failure {
                    output.push_str(&format!("  {} {}\n", "critic failed:".red(), failure));
                }
                Self::push_items(&mut output, "Agreement", &report.agreements);
                Self::push_items(&mut output, "Contradiction", &report.contradictions);
                Self::push_items(&mut output, "Gap", &report.gaps);
            }
        }

        if result.rounds.len() > 1 {
            output.push_str(&Self::section_header("Convergence"));
            for record in &result.rounds {
                let delta = record
                    .confidence_delta
                    .map(|d| format!(" ({:+.2})", d))
                    .unwrap_or_default();
                output.push_str(&format!(
                    "  round {}: confidence {:.2}{}, {} gaps, {} contradictions, {} ms\n",
                    record.round,
                    record.confidence,
                    delta,
                    record.critic_gaps,
                    record.critic_contradictions,
                    record.duration_ms
                ));
            }
        }

        output.push_str(&Self::section_header("Assessment"));
        output.push_str(&Self::assessment(result));
        output.push_str(&format!("\n{}\n", result.synthesis));

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(result: &CouncilResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the overall assessment only (concise output)
    pub fn format_summary(result: &CouncilResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== Signal Council Assessment ===".cyan().bold()
        ));
        output.push_str(&format!("{} {}\n\n", "Q:".bold(), result.query));
        output.push_str(&Self::assessment(result));
        output.push('\n');
        output.push_str(&result.synthesis);
        output.push('\n');

        output
    }

    /// Format an intent classifier decision (for `--classify-only`)
    pub fn format_intent(query: &Query, intent: &Intent) -> String {
        format!(
            "{} {}\n{} {} ({})\n{} {}\n",
            "Query:".cyan().bold(),
            query,
            "Mode:".cyan().bold(),
            intent.mode,
            intent.mode.description(),
            "Primary signal:".cyan().bold(),
            intent.primary_signal.display_name()
        )
    }

    fn assessment(result: &CouncilResult) -> String {
        let mut line = format!(
            "{} {}  {} {:.2}  {} {}",
            "Severity:".bold(),
            Self::severity(result.overall_severity),
            "Confidence:".bold(),
            result.overall_confidence,
            "Rounds:".bold(),
            result.rounds_executed
        );
        if result.complete {
            line.push_str(&format!("  {}", result.termination.to_string().dimmed()));
        } else {
            line.push_str(&format!(
                "  {}",
                format!("incomplete: {}", result.termination).red().bold()
            ));
        }
        let degraded = result.degraded_count();
        if degraded > 0 {
            line.push_str(&format!(
                "\n{}",
                format!("{} of {} workers degraded", degraded, result.findings.len()).yellow()
            ));
        }
        line.push('\n');
        line
    }

    fn push_items(output: &mut String, label: &str, items: &[CritiqueItem]) {
        for item in items {
            let workers = item
                .workers
                .iter()
                .map(|w| w.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            output.push_str(&format!("  {} [{}] {}\n", label.bold(), workers, item.note));
        }
    }

    fn severity(severity: Severity) -> ColoredString {
        let label = severity.as_str().to_uppercase();
        match severity {
            Severity::Critical => label.red().bold(),
            Severity::Warning => label.yellow().bold(),
            Severity::Info => label.blue(),
            Severity::Healthy => label.green(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, result: &CouncilResult) -> String {
        Self::format(result)
    }

    fn format_json(&self, result: &CouncilResult) -> String {
        Self::format_json(result)
    }

    fn format_summary(&self, result: &CouncilResult) -> String {
        Self::format_summary(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::OutputFormat;
    use council_domain::{
        CriticReport, Finding, InvestigationMode, RoundRecord, SignalDomain, Termination, WorkerId,
    };
    use std::collections::BTreeMap;

    fn sample_result(complete: bool) -> CouncilResult {
        let mut findings = BTreeMap::new();
        findings.insert(
            WorkerId::new("logs"),
            Finding::new("5xx burst in checkout", Severity::Critical, 0.8)
                .with_evidence("1.2k errors/min")
                .with_action("roll back deploy 4411"),
        );
        findings.insert(
            WorkerId::new("sql"),
            Finding::degraded(&WorkerId::new("sql"), "timed out after 30s"),
        );

        let mut critic = CriticReport::new(1);
        critic.gaps.push(CritiqueItem::new(
            vec![WorkerId::new("logs")],
            "no trace correlation",
        ));

        CouncilResult {
            investigation_id: "inv-42".to_string(),
            query: "why is checkout failing".to_string(),
            mode: InvestigationMode::Debate,
            primary_signal: SignalDomain::Logs,
            overall_severity: Severity::Critical,
            overall_confidence: 0.72,
            synthesis: "Deploy 4411 broke checkout.".to_string(),
            findings,
            critic_reports: vec![critic],
            rounds: vec![
                RoundRecord {
                    round: 0,
                    confidence: 0.6,
                    confidence_delta: None,
                    critic_gaps: 0,
                    critic_contradictions: 0,
                    duration_ms: 1200,
                },
                RoundRecord {
                    round: 1,
                    confidence: 0.72,
                    confidence_delta: Some(0.12),
                    critic_gaps: 1,
                    critic_contradictions: 0,
                    duration_ms: 900,
                },
            ],
            rounds_executed: 1,
            duration_ms: 2100,
            complete,
            termination: if complete {
                Termination::RoundLimit
            } else {
                Termination::PipelineTimeout
            },
        }
    }

    #[test]
    fn test_full_report_sections() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format(&sample_result(true));

        assert!(text.contains("5xx burst in checkout"));
        assert!(text.contains("roll back deploy 4411"));
        assert!(text.contains("no trace correlation"));
        assert!(text.contains("round 1: confidence 0.72 (+0.12)"));
        assert!(text.contains("1 of 2 workers degraded"));
        assert!(text.contains("Deploy 4411 broke checkout."));
    }

    #[test]
    fn test_summary_marks_incomplete() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format_summary(&sample_result(false));
        assert!(text.contains("incomplete"));
        assert!(!text.contains("no trace correlation"));
    }

    #[test]
    fn test_json_output() {
        let json = ConsoleFormatter.render(&sample_result(true), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["investigation_id"], "inv-42");
        assert_eq!(value["findings"]["sql"]["degraded"], true);
    }
}
