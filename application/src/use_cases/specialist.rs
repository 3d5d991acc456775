//! Specialist workers.
//!
//! An [`AnalysisWorker`] turns one [`RoundContext`] into one [`Finding`] for
//! its signal domain. [`SpecialistWorker`] is the standard implementation:
//! fetch telemetry through the [`ToolGateway`], then ask the
//! [`ReasoningEngine`] to interpret it.

use crate::ports::reasoning_engine::{
    EngineError, PromptContext, PromptPurpose, ReasoningEngine,
};
use crate::ports::tool_gateway::{ToolError, ToolGateway};
use crate::use_cases::shared::invoke_with_retry;
use async_trait::async_trait;
use council_domain::investigation::parsing::parse_finding;
use council_domain::{Finding, PromptTemplate, RoundContext, SignalDomain, WorkerId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a worker produced no finding
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkerError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("all telemetry tools failed: {0}")]
    Tool(String),

    #[error("reasoning engine failed: {0}")]
    Engine(#[from] EngineError),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("cancelled")]
    Cancelled,

    #[error("worker panicked: {0}")]
    Panicked(String),
}

/// A council member covering one signal domain
#[async_trait]
pub trait AnalysisWorker: Send + Sync {
    fn id(&self) -> &WorkerId;

    fn domain(&self) -> SignalDomain;

    /// Produce this worker's finding for the round.
    ///
    /// Must not mutate anything shared with other workers; the context is
    /// read-only for the whole round.
    async fn produce(&self, ctx: &RoundContext) -> Result<Finding, WorkerError>;
}

/// One telemetry tool a worker calls every round.
///
/// String values in `args` may contain `{query}`, replaced with the
/// investigation query before the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolBinding {
    pub name: String,
    #[serde(default = "empty_args")]
    pub args: serde_json::Value,
}

fn empty_args() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

impl ToolBinding {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: empty_args(),
        }
    }

    pub fn with_args(mut self, args: serde_json::Value) -> Self {
        self.args = args;
        self
    }

    fn render_args(&self, query: &str) -> serde_json::Value {
        substitute_query(&self.args, query)
    }
}

fn substitute_query(value: &serde_json::Value, query: &str) -> serde_json::Value {
    use serde_json::Value;
    match value {
        Value::String(s) => Value::String(s.replace("{query}", query)),
        Value::Array(items) => Value::Array(items.iter().map(|v| substitute_query(v, query)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute_query(v, query)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Tool-backed, engine-interpreted worker
pub struct SpecialistWorker {
    id: WorkerId,
    domain: SignalDomain,
    tools: Vec<ToolBinding>,
    gateway: Arc<dyn ToolGateway>,
    engine: Arc<dyn ReasoningEngine>,
}

impl SpecialistWorker {
    pub fn new(
        id: WorkerId,
        domain: SignalDomain,
        gateway: Arc<dyn ToolGateway>,
        engine: Arc<dyn ReasoningEngine>,
    ) -> Self {
        Self {
            id,
            domain,
            tools: Vec::new(),
            gateway,
            engine,
        }
    }

    pub fn with_tool(mut self, tool: ToolBinding) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_tools(mut self, tools: impl IntoIterator<Item = ToolBinding>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn tools(&self) -> &[ToolBinding] {
        &self.tools
    }

    /// Call every bound tool concurrently.
    ///
    /// Returns `(tool, output_or_failure_note)` pairs for the prompt plus the
    /// failures, in binding order.
    async fn gather_telemetry(
        &self,
        ctx: &RoundContext,
    ) -> (Vec<(String, String)>, Vec<(String, ToolError)>) {
        let calls = self.tools.iter().map(|binding| {
            let args = binding.render_args(ctx.query.text());
            let gateway = Arc::clone(&self.gateway);
            async move {
                let result = gateway.call_tool(&binding.name, &args).await;
                (binding.name.clone(), result)
            }
        });

        let mut outputs = Vec::new();
        let mut failures = Vec::new();
        for (name, result) in futures::future::join_all(calls).await {
            match result {
                Ok(output) => outputs.push((name, output.content)),
                Err(e) => {
                    warn!("Worker {} tool {} failed: {}", self.id, name, e);
                    outputs.push((name.clone(), format!("(unavailable: {})", e)));
                    failures.push((name, e));
                }
            }
        }
        (outputs, failures)
    }
}

#[async_trait]
impl AnalysisWorker for SpecialistWorker {
    fn id(&self) -> &WorkerId {
        &self.id
    }

    fn domain(&self) -> SignalDomain {
        self.domain
    }

    async fn produce(&self, ctx: &RoundContext) -> Result<Finding, WorkerError> {
        let (outputs, failures) = self.gather_telemetry(ctx).await;

        if !self.tools.is_empty() && failures.len() == self.tools.len() {
            let reasons = failures
                .iter()
                .map(|(name, e)| format!("{}: {}", name, e))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(WorkerError::Tool(reasons));
        }

        let prompt = PromptContext::new(
            PromptPurpose::Worker(self.domain),
            ctx.investigation_id.clone(),
            ctx.round,
            PromptTemplate::worker_system(self.domain),
            PromptTemplate::worker_prompt(ctx, &self.id, &outputs),
        );

        let response = invoke_with_retry(self.engine.as_ref(), &prompt).await?;
        debug!(
            "Worker {} round {} used {} tokens",
            self.id,
            ctx.round,
            response.usage.total()
        );

        let mut finding = parse_finding(&response.text)
            .map_err(|e| WorkerError::MalformedResponse(e.to_string()))?;

        for (name, e) in failures {
            finding = finding.with_evidence(format!("tool {} unavailable: {}", name, e));
        }
        Ok(finding)
    }
}
