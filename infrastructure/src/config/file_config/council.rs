//! Council configuration from TOML (`[council]` section)
//!
//! ```toml
//! [council]
//! mode = "debate"              # optional: skip the intent classifier
//! max_rounds = 3
//! confidence_threshold = 0.85
//! pipeline_timeout_secs = 120
//! worker_timeout_secs = 30     # optional cap per worker / critic / synthesis call
//! agreement_bonus = 0.05
//! ```

use council_application::{CouncilParams, MAX_DEBATE_ROUNDS, MAX_PIPELINE_TIMEOUT};
use council_domain::{ConfigIssue, ConfigIssueCode, InvestigationMode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    /// Forced investigation mode ("fast", "standard", "debate")
    pub mode: Option<String>,
    pub max_rounds: usize,
    pub confidence_threshold: f64,
    pub pipeline_timeout_secs: u64,
    pub worker_timeout_secs: Option<u64>,
    pub agreement_bonus: f64,
}

impl Default for FileCouncilConfig {
    fn default() -> Self {
        let params = CouncilParams::default();
        Self {
            mode: None,
            max_rounds: params.max_rounds,
            confidence_threshold: params.confidence_threshold,
            pipeline_timeout_secs: params.pipeline_timeout.as_secs(),
            worker_timeout_secs: None,
            agreement_bonus: params.agreement_bonus,
        }
    }
}

impl FileCouncilConfig {
    /// Convert to application params. Validation is separate (see
    /// [`FileCouncilConfig::issues`]); out-of-range values pass through.
    pub fn to_params(&self) -> CouncilParams {
        CouncilParams::default()
            .with_max_rounds(self.max_rounds)
            .with_confidence_threshold(self.confidence_threshold)
            .with_pipeline_timeout(Duration::from_secs(self.pipeline_timeout_secs))
            .with_worker_timeout(self.worker_timeout_secs.map(Duration::from_secs))
            .with_agreement_bonus(self.agreement_bonus)
    }

    /// Parse the forced mode, if any. Unknown values are dropped with a warning.
    pub fn parse_mode(&self) -> (Option<InvestigationMode>, Vec<ConfigIssue>) {
        let Some(raw) = &self.mode else {
            return (None, vec![]);
        };
        match raw.parse::<InvestigationMode>() {
            Ok(mode) => (Some(mode), vec![]),
            Err(_) => (
                None,
                vec![ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "council.mode".to_string(),
                        value: raw.clone(),
                        valid_values: vec![
                            "fast".to_string(),
                            "standard".to_string(),
                            "debate".to_string(),
                        ],
                    },
                    format!(
                        "council.mode: unknown value '{}', using the intent classifier",
                        raw
                    ),
                )],
            ),
        }
    }

    pub fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = self.parse_mode().1;

        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "council.confidence_threshold".to_string(),
                },
                format!(
                    "council.confidence_threshold must be within 0.0..=1.0 (got {})",
                    self.confidence_threshold
                ),
            ));
        }

        if !(0.0..=1.0).contains(&self.agreement_bonus) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "council.agreement_bonus".to_string(),
                },
                format!(
                    "council.agreement_bonus must be within 0.0..=1.0 (got {})",
                    self.agreement_bonus
                ),
            ));
        }

        if self.pipeline_timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout {
                    field: "council.pipeline_timeout_secs".to_string(),
                },
                "council.pipeline_timeout_secs cannot be 0",
            ));
        }

        if self.pipeline_timeout_secs > MAX_PIPELINE_TIMEOUT.as_secs() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "council.pipeline_timeout_secs".to_string(),
                },
                format!(
                    "council.pipeline_timeout_secs must be at most {} (got {})",
                    MAX_PIPELINE_TIMEOUT.as_secs(),
                    self.pipeline_timeout_secs
                ),
            ));
        }

        if self.worker_timeout_secs == Some(0) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout {
                    field: "council.worker_timeout_secs".to_string(),
                },
                "council.worker_timeout_secs cannot be 0",
            ));
        }

        if self.max_rounds > MAX_DEBATE_ROUNDS {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "council.max_rounds".to_string(),
                },
                format!(
                    "council.max_rounds must be at most {} (got {})",
                    MAX_DEBATE_ROUNDS, self.max_rounds
                ),
            ));
        } else if self.max_rounds > 10 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "council.max_rounds".to_string(),
                },
                format!(
                    "council.max_rounds = {} will rarely finish inside the pipeline budget",
                    self.max_rounds
                ),
            ));
        }

        issues
    }
}
