//! Shared utilities for use cases.
//!
//! Contains the retrying engine call used by the specialist workers, the
//! critic, and the synthesizer.

use crate::ports::reasoning_engine::{EngineError, EngineResponse, PromptContext, ReasoningEngine};
use tracing::{debug, warn};

/// Invoke the reasoning engine, retrying exactly once on a transient error.
///
/// Fatal errors and a second transient failure are returned as-is.
pub(crate) async fn invoke_with_retry(
    engine: &dyn ReasoningEngine,
    prompt: &PromptContext,
) -> Result<EngineResponse, EngineError> {
    match engine.invoke(prompt).await {
        Err(e) if e.is_transient() => {
            warn!(
                "Transient engine error for {} (round {}), retrying once: {}",
                prompt.purpose.as_str(),
                prompt.round,
                e
            );
            let retried = engine.invoke(prompt).await;
            if retried.is_ok() {
                debug!("Retry succeeded for {}", prompt.purpose.as_str());
            }
            retried
        }
        other => other,
    }
}
