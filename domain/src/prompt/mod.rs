//! Prompt domain
//!
//! Templates for the worker, critic, and synthesizer reasoning-engine calls.

mod template;

pub use template::PromptTemplate;
