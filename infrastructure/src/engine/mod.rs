//! Reasoning engine adapters
//!
//! [`HttpReasoningEngine`] implements the
//! [`ReasoningEngine`](council_application::ReasoningEngine) port against any
//! OpenAI-compatible chat completions endpoint.

mod http;

pub use http::HttpReasoningEngine;
