//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod reasoning_engine;
pub mod telemetry;
pub mod tool_gateway;
