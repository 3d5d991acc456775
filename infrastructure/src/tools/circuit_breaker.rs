//! Per-tool circuit breaker decorating any [`ToolGateway`].
//!
//! ```text
//! Closed ──(threshold consecutive failures)──▶ Open
//!   ▲                                           │
//!   │ probe succeeds                  cooldown  │
//!   │                                           ▼
//!   └──────────────────────────────────── HalfOpen ──(probe fails)──▶ Open
//! ```
//!
//! While a tool's circuit is open, calls fail fast with
//! [`ToolError::CircuitOpen`] without reaching the inner gateway. Only one
//! probe is let through in the half-open state. A probe that never reports
//! back (its caller was cancelled or timed out) is replaced by a fresh one
//! after another cooldown.

use async_trait::async_trait;
use council_application::{ToolError, ToolGateway, ToolOutput};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed { failures: u32 },
    Open { since: Instant },
    /// One probe is in flight since `since`
    HalfOpen { since: Instant },
}

impl Default for CircuitState {
    fn default() -> Self {
        CircuitState::Closed { failures: 0 }
    }
}

pub struct CircuitBreakerToolGateway {
    inner: Arc<dyn ToolGateway>,
    failure_threshold: u32,
    cooldown: Duration,
    circuits: Mutex<HashMap<String, CircuitState>>,
}

impl CircuitBreakerToolGateway {
    pub fn new(inner: Arc<dyn ToolGateway>, failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            inner,
            failure_threshold: failure_threshold.max(1),
            cooldown,
            circuits: Mutex::new(HashMap::new()),
        }
    }

    /// Current state of a tool's circuit (Closed if never called)
    pub fn state(&self, tool: &str) -> CircuitState {
        self.lock().get(tool).copied().unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CircuitState>> {
        self.circuits.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Decide whether a call may proceed, moving Open to HalfOpen once the
    /// cooldown has elapsed.
    fn admit(&self, tool: &str) -> bool {
        let mut circuits = self.lock();
        let state = circuits.entry(tool.to_string()).or_default();
        match *state {
            CircuitState::Closed { .. } => true,
            CircuitState::Open { since } | CircuitState::HalfOpen { since } => {
                if since.elapsed() >= self.cooldown {
                    info!("Circuit for tool {} half-open, probing", tool);
                    *state = CircuitState::HalfOpen {
                        since: Instant::now(),
                    };
                    true
                } else {
                    false
                }
            }
        }
    }

    fn record_success(&self, tool: &str) {
        let mut circuits = self.lock();
        if let Some(state) = circuits.get_mut(tool) {
            if matches!(state, CircuitState::HalfOpen { .. }) {
                info!("Circuit for tool {} closed", tool);
            }
            *state = CircuitState::default();
        }
    }

    fn record_failure(&self, tool: &str) {
        let mut circuits = self.lock();
        let state = circuits.entry(tool.to_string()).or_default();
        *state = match *state {
            CircuitState::Closed { failures } if failures + 1 < self.failure_threshold => {
                CircuitState::Closed {
                    failures: failures + 1,
                }
            }
            CircuitState::Closed { .. } | CircuitState::HalfOpen { .. } => {
                warn!(
                    "Circuit for tool {} opened for {:?}",
                    tool, self.cooldown
                );
                CircuitState::Open {
                    since: Instant::now(),
                }
            }
            open @ CircuitState::Open { .. } => open,
        };
    }
}

#[async_trait]
impl ToolGateway for CircuitBreakerToolGateway {
    async fn call_tool(
        &self,
        name: &str,
        args: &serde_json::Value,
    ) -> Result<ToolOutput, ToolError> {
        if !self.admit(name) {
            return Err(ToolError::CircuitOpen(name.to_string()));
        }

        let result = self.inner.call_tool(name, args).await;
        match &result {
            Ok(_) => self.record_success(name),
            Err(_) => self.record_failure(name),
        }
        result
    }
}
