//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod critic;
pub mod run_council;
pub(crate) mod shared;
pub mod specialist;
pub mod synthesizer;
pub mod worker_pool;
