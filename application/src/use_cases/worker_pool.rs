//! Concurrent worker fan-out with a join barrier.
//!
//! One round = every worker runs once, concurrently, against the same
//! read-only [`RoundContext`]. The round ends only when every worker has
//! either returned, failed, timed out, panicked, or been cancelled, and the
//! resulting map always holds exactly one entry per dispatched worker.

use crate::ports::telemetry::{CouncilEvent, TelemetrySink};
use crate::use_cases::specialist::{AnalysisWorker, WorkerError};
use council_domain::{Finding, RoundContext, WorkerId};
use futures::FutureExt;
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runs one round of workers and collects their findings
pub struct WorkerPoolExecutor {
    telemetry: Arc<dyn TelemetrySink>,
}

impl WorkerPoolExecutor {
    pub fn new(telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self { telemetry }
    }

    /// Dispatch `workers` and wait for all of them.
    ///
    /// Each worker gets `budget`; a worker that exceeds it, errors, panics, or
    /// is cancelled through `cancel` is recorded as a degraded finding.
    pub async fn run_round(
        &self,
        workers: &[Arc<dyn AnalysisWorker>],
        ctx: Arc<RoundContext>,
        budget: Duration,
        cancel: &CancellationToken,
    ) -> BTreeMap<WorkerId, Finding> {
        info!(
            "Round {}: dispatching {} workers (budget {:?})",
            ctx.round,
            workers.len(),
            budget
        );

        let mut join_set = JoinSet::new();

        for worker in workers {
            let worker = Arc::clone(worker);
            let ctx = Arc::clone(&ctx);
            let token = cancel.clone();

            join_set.spawn(async move {
                let started = Instant::now();
                let id = worker.id().clone();
                let outcome = run_guarded(worker.as_ref(), &ctx, budget, &token).await;
                (id, outcome, started.elapsed())
            });
        }

        let mut findings = BTreeMap::new();

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((id, outcome, elapsed)) => {
                    let finding = match outcome {
                        Ok(finding) => {
                            debug!("Worker {} finished in {:?}", id, elapsed);
                            finding
                        }
                        Err(e) => {
                            warn!("Worker {} failed in round {}: {}", id, ctx.round, e);
                            Finding::degraded(&id, &e)
                        }
                    };
                    self.telemetry.emit(&CouncilEvent::WorkerCompleted {
                        investigation_id: ctx.investigation_id.clone(),
                        round: ctx.round,
                        worker: id.clone(),
                        degraded: finding.is_degraded(),
                        severity: finding.severity,
                        confidence: finding.confidence,
                        elapsed_ms: elapsed.as_millis() as u64,
                    });
                    findings.insert(id, finding);
                }
                Err(e) => {
                    warn!("Worker task join error: {}", e);
                }
            }
        }

        // A task lost to a join error still owes the round an entry.
        for worker in workers {
            if !findings.contains_key(worker.id()) {
                let id = worker.id().clone();
                let finding = Finding::degraded(&id, "worker task aborted");
                self.telemetry.emit(&CouncilEvent::WorkerCompleted {
                    investigation_id: ctx.investigation_id.clone(),
                    round: ctx.round,
                    worker: id.clone(),
                    degraded: true,
                    severity: finding.severity,
                    confidence: finding.confidence,
                    elapsed_ms: 0,
                });
                findings.insert(id, finding);
            }
        }

        findings
    }
}

async fn run_guarded(
    worker: &dyn AnalysisWorker,
    ctx: &RoundContext,
    budget: Duration,
    token: &CancellationToken,
) -> Result<Finding, WorkerError> {
    let work = AssertUnwindSafe(worker.produce(ctx)).catch_unwind();

    tokio::select! {
        _ = token.cancelled() => Err(WorkerError::Cancelled),
        result = tokio::time::timeout(budget, work) => match result {
            Err(_) => Err(WorkerError::Timeout(budget)),
            Ok(Err(panic)) => Err(WorkerError::Panicked(panic_message(&*panic))),
            Ok(Ok(outcome)) => outcome,
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
