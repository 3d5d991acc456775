//! Investigation domain
//!
//! Types and pure policies for a council investigation:
//!
//! - [`mode`] - investigation modes and signal domains
//! - [`finding`] - per-worker findings, severity, worker identity
//! - [`critique`] - critic reports exchanged between debate rounds
//! - [`context`] - the immutable per-round input shared by workers
//! - [`aggregation`] - severity and confidence-bound policy for synthesis
//! - [`convergence`] - round bookkeeping and the stop condition
//! - [`state`] - orchestrator state machine states
//! - [`result`] - the final [`result::CouncilResult`]
//! - [`parsing`] - structured reply parsing

pub mod aggregation;
pub mod context;
pub mod convergence;
pub mod critique;
pub mod finding;
pub mod mode;
pub mod parsing;
pub mod result;
pub mod state;

pub use aggregation::{bound_confidence, confidence_ceiling, overall_severity};
pub use context::RoundContext;
pub use convergence::{ConvergenceTracker, RoundRecord, Termination};
pub use critique::{CriticReport, CritiqueItem};
pub use finding::{Finding, Severity, WorkerId};
pub use mode::{InvestigationMode, SignalDomain};
pub use result::{CouncilResult, Synthesis};
pub use state::OrchestratorState;
