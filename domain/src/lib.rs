//! Domain layer for signal-council
//!
//! This crate contains the core investigation types and pure policies.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Council
//!
//! A council investigation sends one query to several specialist workers,
//! each covering one observability signal domain (alerts, metrics, logs,
//! traces, SQL), and merges their [`Finding`]s into one assessment.
//!
//! ## Fast / Standard / Debate ([`InvestigationMode`])
//!
//! - **Fast**: one worker for the query's primary signal, one pass
//! - **Standard**: every worker, one pass
//! - **Debate**: every worker, then critique and re-analysis rounds until
//!   the confidence gate or the round limit stops the loop

pub mod core;
pub mod intent;
pub mod investigation;
pub mod prompt;

// Re-export commonly used types
pub use core::{
    error::DomainError,
    query::Query,
    validation::{ConfigIssue, ConfigIssueCode, IssueSeverity},
};
pub use intent::{Intent, IntentClassifier, IntentRules};
pub use investigation::{
    ConvergenceTracker, CouncilResult, CriticReport, CritiqueItem, Finding, InvestigationMode,
    OrchestratorState, RoundContext, RoundRecord, Severity, SignalDomain, Synthesis, Termination,
    WorkerId,
};
pub use prompt::PromptTemplate;
