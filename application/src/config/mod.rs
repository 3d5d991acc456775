//! Application-level configuration.
//!
//! - [`CouncilParams`] - debate loop control (round limit, confidence gate and time budgets)

pub mod council_params;

pub use council_params::{CouncilParams, MAX_DEBATE_ROUNDS, MAX_PIPELINE_TIMEOUT};
