//! Intent classifier configuration from TOML (`[intent]` section)
//!
//! ```toml
//! [intent]
//! fast_length_threshold = 100
//! default_signal = "alerts"
//!
//! [intent.keywords]
//! metrics = ["rps", "apdex"]
//! sql = ["pg_stat"]
//! ```

use council_domain::{ConfigIssue, ConfigIssueCode, IntentRules, SignalDomain};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileIntentConfig {
    pub fast_length_threshold: usize,
    pub default_signal: String,
    /// Extra keywords per signal domain, added to the built-in lists
    pub keywords: BTreeMap<String, Vec<String>>,
}

impl Default for FileIntentConfig {
    fn default() -> Self {
        let rules = IntentRules::default();
        Self {
            fast_length_threshold: rules.fast_length_threshold,
            default_signal: rules.default_signal.as_str().to_string(),
            keywords: BTreeMap::new(),
        }
    }
}

fn domain_names() -> Vec<String> {
    SignalDomain::ALL
        .iter()
        .map(|d| d.as_str().to_string())
        .collect()
}

impl FileIntentConfig {
    /// Build classifier rules. Unknown domain names are skipped with a warning.
    pub fn to_rules(&self) -> (IntentRules, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let mut rules =
            IntentRules::default().with_fast_length_threshold(self.fast_length_threshold);

        match self.default_signal.parse::<SignalDomain>() {
            Ok(domain) => rules = rules.with_default_signal(domain),
            Err(_) => issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidEnumValue {
                    field: "intent.default_signal".to_string(),
                    value: self.default_signal.clone(),
                    valid_values: domain_names(),
                },
                format!(
                    "intent.default_signal: unknown domain '{}', falling back to 'alerts'",
                    self.default_signal
                ),
            )),
        }

        for (name, words) in &self.keywords {
            match name.parse::<SignalDomain>() {
                Ok(domain) => rules = rules.with_extra_keywords(domain, words.iter().cloned()),
                Err(_) => issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "intent.keywords".to_string(),
                        value: name.clone(),
                        valid_values: domain_names(),
                    },
                    format!("intent.keywords: unknown domain '{}' ignored", name),
                )),
            }
        }

        (rules, issues)
    }
}
