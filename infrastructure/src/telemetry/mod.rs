//! Telemetry infrastructure: the structured council event feed.
//!
//! Provides [`JsonlTelemetrySink`], a JSONL file writer that implements
//! the [`TelemetrySink`](council_application::TelemetrySink) port.

mod jsonl_sink;

pub use jsonl_sink::JsonlTelemetrySink;
