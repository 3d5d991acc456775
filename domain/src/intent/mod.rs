//! Intent classification
//!
//! Maps a free-text query to an [`InvestigationMode`](crate::InvestigationMode)
//! and a primary [`SignalDomain`](crate::SignalDomain) using keyword rules.
//! No learning, no external state.

pub mod classifier;
pub mod rules;

pub use classifier::{Intent, IntentClassifier};
pub use rules::IntentRules;
