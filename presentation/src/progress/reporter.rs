//! Progress reporting for council execution
//!
//! Both reporters consume [`CouncilEvent`]s through the [`TelemetrySink`]
//! port, so the orchestrator never knows a terminal is attached.

use colored::Colorize;
use council_application::{CouncilEvent, TelemetrySink};
use council_domain::OrchestratorState;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

#[derive(Default)]
struct RoundBars {
    workers: usize,
    current: Option<ProgressBar>,
}

/// Reports progress with one bar per round
pub struct ProgressReporter {
    multi: MultiProgress,
    state: Mutex<RoundBars>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            state: Mutex::new(RoundBars::default()),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn start_round(&self, bars: &mut RoundBars, label: String) {
        if let Some(previous) = bars.current.take() {
            previous.finish_and_clear();
        }
        let pb = self.multi.add(ProgressBar::new(bars.workers as u64));
        pb.set_style(Self::round_style());
        pb.set_prefix(label);
        pb.set_message("Dispatching...");
        bars.current = Some(pb);
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySink for ProgressReporter {
    fn emit(&self, event: &CouncilEvent) {
        let Ok(mut bars) = self.state.lock() else {
            return;
        };

        match event {
            CouncilEvent::InvestigationStarted { mode, workers, .. } => {
                bars.workers = workers.len();
                let _ = self.multi.println(format!(
                    "{} {} investigation with {} workers",
                    "->".cyan(),
                    mode.as_str().bold(),
                    workers.len()
                ));
            }
            CouncilEvent::StateTransition { from, to, .. } => {
                if *to == OrchestratorState::Dispatched {
                    let round = match from {
                        OrchestratorState::DebateRound(n) => *n,
                        _ => 0,
                    };
                    self.start_round(&mut bars, format!("Round {}", round));
                }
            }
            CouncilEvent::WorkerCompleted {
                worker, degraded, ..
            } => {
                if let Some(pb) = bars.current.as_ref() {
                    let status = if *degraded {
                        format!("{} {}", "x".red(), worker)
                    } else {
                        format!("{} {}", "v".green(), worker)
                    };
                    pb.set_message(status);
                    pb.inc(1);
                }
            }
            CouncilEvent::CriticCompleted {
                round,
                contradictions,
                gaps,
                failure,
                ..
            } => {
                let line = match failure {
                    Some(reason) => format!("  {} critic round {}: {}", "!".yellow(), round, reason),
                    None => format!(
                        "  {} critic round {}: {} contradictions, {} gaps",
                        "?".cyan(),
                        round,
                        contradictions,
                        gaps
                    ),
                };
                let _ = self.multi.println(line);
            }
            CouncilEvent::RoundSynthesized {
                round,
                severity,
                confidence,
                ..
            } => {
                if let Some(pb) = bars.current.take() {
                    pb.finish_with_message(format!(
                        "{} round {}: {} at {:.2}",
                        "done".green(),
                        round,
                        severity,
                        confidence
                    ));
                }
            }
            CouncilEvent::InvestigationFinished { .. } => {
                if let Some(pb) = bars.current.take() {
                    pb.finish_and_clear();
                }
            }
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl TelemetrySink for SimpleProgress {
    fn emit(&self, event: &CouncilEvent) {
        match event {
            CouncilEvent::InvestigationStarted { mode, workers, .. } => {
                eprintln!(
                    "{} {} ({} workers)",
                    "->".cyan(),
                    mode.as_str().bold(),
                    workers.len()
                );
            }
            CouncilEvent::WorkerCompleted {
                round,
                worker,
                degraded,
                ..
            } => {
                if *degraded {
                    eprintln!("  {} [{}] {} (degraded)", "x".red(), round, worker);
                } else {
                    eprintln!("  {} [{}] {}", "v".green(), round, worker);
                }
            }
            CouncilEvent::RoundSynthesized {
                round, confidence, ..
            } => {
                eprintln!("  = round {} confidence {:.2}", round, confidence);
            }
            CouncilEvent::InvestigationFinished { termination, .. } => {
                eprintln!("{} {}", "->".cyan(), termination);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{InvestigationMode, Severity, SignalDomain, WorkerId};

    fn events() -> Vec<CouncilEvent> {
        let id = "inv".to_string();
        vec![
            CouncilEvent::InvestigationStarted {
                investigation_id: id.clone(),
                mode: InvestigationMode::Standard,
                primary_signal: SignalDomain::Logs,
                workers: vec![WorkerId::new("logs"), WorkerId::new("traces")],
            },
            CouncilEvent::StateTransition {
                investigation_id: id.clone(),
                from: OrchestratorState::Init,
                to: OrchestratorState::Dispatched,
            },
            CouncilEvent::WorkerCompleted {
                investigation_id: id.clone(),
                round: 0,
                worker: WorkerId::new("logs"),
                degraded: false,
                severity: Severity::Warning,
                confidence: 0.6,
                elapsed_ms: 10,
            },
        ]
    }

    #[test]
    fn test_reporter_tracks_round_bar() {
        let reporter = ProgressReporter::new();
        for event in events() {
            reporter.emit(&event);
        }

        let bars = reporter.state.lock().unwrap();
        assert_eq!(bars.workers, 2);
        assert_eq!(bars.current.as_ref().map(|pb| pb.position()), Some(1));
    }

    #[test]
    fn test_round_synthesized_finishes_bar() {
        let reporter = ProgressReporter::new();
        for event in events() {
            reporter.emit(&event);
        }
        reporter.emit(&CouncilEvent::RoundSynthesized {
            investigation_id: "inv".to_string(),
            round: 0,
            severity: Severity::Warning,
            confidence: 0.6,
            confidence_delta: None,
        });

        assert!(reporter.state.lock().unwrap().current.is_none());
    }
}
