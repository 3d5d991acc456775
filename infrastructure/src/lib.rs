//! Infrastructure layer for signal-council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod engine;
pub mod telemetry;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileCouncilConfig, FileEngineConfig,
    FileIntentConfig, FileTelemetryConfig, FileToolEntry, FileToolsConfig, FileWorkerConfig,
};
pub use engine::HttpReasoningEngine;
pub use telemetry::JsonlTelemetrySink;
pub use tools::{CircuitBreakerToolGateway, CircuitState, DisabledToolGateway, HttpToolGateway};
