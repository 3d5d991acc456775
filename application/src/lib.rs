//! Application layer for signal-council
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{CouncilParams, MAX_DEBATE_ROUNDS, MAX_PIPELINE_TIMEOUT};
pub use ports::{
    reasoning_engine::{
        EngineError, EngineResponse, PromptContext, PromptPurpose, ReasoningEngine, TokenUsage,
    },
    telemetry::{CompositeTelemetry, CouncilEvent, NoTelemetry, TelemetrySink},
    tool_gateway::{ToolError, ToolGateway, ToolOutput},
};
pub use use_cases::critic::{Critic, CriticError};
pub use use_cases::run_council::{RunCouncilError, RunCouncilInput, RunCouncilUseCase};
pub use use_cases::specialist::{AnalysisWorker, SpecialistWorker, ToolBinding, WorkerError};
pub use use_cases::synthesizer::{SynthesisError, Synthesizer};
pub use use_cases::worker_pool::WorkerPoolExecutor;
