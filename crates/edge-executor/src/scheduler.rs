//! Fan-out runner: spawn every worker, wait for all, report.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use edge_core::{duration_to_ms, FanOutPlan, LifecycleObserver, LifecyclePhase};
use futures::future::join_all;
use futures::FutureExt;
use tracing::Instrument;

use crate::error::FanOutError;
use crate::worker::Worker;

/// Final status of a worker after the join barrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerStatus {
    /// Ran to completion.
    Completed,
    /// Returned an error.
    Failed(Option<String>),
    /// Panicked; carries the panic payload when it was a string.
    Panicked(Option<String>),
    /// The task was cancelled before it could report.
    Aborted,
}

impl WorkerStatus {
    /// Check if the worker completed.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// What happened to one worker.
#[derive(Debug, Clone)]
pub struct WorkerOutcome {
    /// Worker index.
    pub index: usize,
    /// How long the worker ran.
    pub elapsed: Duration,
    /// Final status.
    pub status: WorkerStatus,
}

impl WorkerOutcome {
    fn to_error(&self) -> Option<FanOutError> {
        let index = self.index;
        match &self.status {
            WorkerStatus::Completed => None,
            WorkerStatus::Failed(message) | WorkerStatus::Panicked(message) => {
                Some(FanOutError::Worker {
                    index,
                    message: message.clone(),
                })
            }
            WorkerStatus::Aborted => Some(FanOutError::Join {
                index,
                message: Some("worker task was cancelled".to_string()),
            }),
        }
    }
}

/// Result of a fan-out once every worker has finished.
#[derive(Debug, Clone)]
pub struct FanOutReport {
    /// The plan that was run.
    pub plan: FanOutPlan,
    /// Wall-clock time from first spawn to fan-in.
    pub elapsed: Duration,
    /// One outcome per worker, ordered by index.
    pub outcomes: Vec<WorkerOutcome>,
}

impl FanOutReport {
    /// Whether every worker completed.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.is_completed())
    }

    /// The failure of the lowest-indexed worker that did not complete.
    pub fn first_failure(&self) -> Option<FanOutError> {
        self.outcomes.iter().find_map(WorkerOutcome::to_error)
    }

    /// Elapsed time in whole milliseconds.
    pub fn duration_ms(&self) -> u64 {
        duration_to_ms(self.elapsed)
    }

    /// Turn the report into a result: the first failure wins.
    pub fn into_result(self) -> Result<Self, FanOutError> {
        match self.first_failure() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

/// Launches `plan.workers` concurrent workers and waits for all of them.
///
/// Workers run as tokio tasks, so they spread across the runtime's worker
/// threads. There is no timeout or cancellation: the barrier releases only
/// after every task has returned, panicked, or been torn down.
#[derive(Clone)]
pub struct FanOut {
    plan: FanOutPlan,
    observer: Option<Arc<dyn LifecycleObserver>>,
}

impl FanOut {
    /// Create a runner for a plan.
    pub fn new(plan: FanOutPlan) -> Self {
        Self {
            plan,
            observer: None,
        }
    }

    /// Report lifecycle phases to an observer.
    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Run every worker and return the report, whatever the outcome.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn execute<W>(&self, worker: Arc<W>) -> FanOutReport
    where
        W: Worker + ?Sized,
    {
        let start = Instant::now();
        self.notify(LifecyclePhase::FanOutStarted, start);
        tracing::debug!(workers = self.plan.workers, "fan-out started");

        let handles: Vec<_> = (0..self.plan.workers)
            .map(|index| {
                let worker = Arc::clone(&worker);
                let observer = self.observer.clone();
                let span = tracing::debug_span!("worker", index);
                tokio::spawn(
                    async move {
                        let began = Instant::now();
                        let result = AssertUnwindSafe(worker.run(index)).catch_unwind().await;
                        let elapsed = began.elapsed();

                        let status = match result {
                            Ok(Ok(())) => {
                                tracing::trace!("worker completed");
                                WorkerStatus::Completed
                            }
                            Ok(Err(err)) => {
                                tracing::debug!(error = %err, "worker failed");
                                WorkerStatus::Failed(err.message().map(str::to_string))
                            }
                            Err(payload) => {
                                let message = panic_message(payload.as_ref());
                                tracing::warn!(
                                    panic = message.as_deref().unwrap_or("<non-string payload>"),
                                    "worker panicked"
                                );
                                WorkerStatus::Panicked(message)
                            }
                        };

                        if let Some(observer) = observer {
                            observer.on_phase(LifecyclePhase::WorkerFinished(index), start.elapsed());
                        }

                        (elapsed, status)
                    }
                    .instrument(span),
                )
            })
            .collect();

        let joined = join_all(handles).await;
        let elapsed = start.elapsed();

        self.notify(LifecyclePhase::Joined, start);
        tracing::debug!(elapsed_ms = duration_to_ms(elapsed), "fan-in complete");

        let outcomes = joined
            .into_iter()
            .enumerate()
            .map(|(index, joined)| match joined {
                Ok((elapsed, status)) => WorkerOutcome {
                    index,
                    elapsed,
                    status,
                },
                Err(join_err) => {
                    // Panics are caught inside the task; normally only cancellation lands here.
                    let status = if join_err.is_panic() {
                        WorkerStatus::Panicked(panic_message(join_err.into_panic().as_ref()))
                    } else {
                        WorkerStatus::Aborted
                    };
                    WorkerOutcome {
                        index,
                        elapsed: Duration::ZERO,
                        status,
                    }
                }
            })
            .collect();

        FanOutReport {
            plan: self.plan,
            elapsed,
            outcomes,
        }
    }

    /// Run every worker; fail with the lowest-indexed failure, if any.
    pub async fn run<W>(&self, worker: Arc<W>) -> Result<FanOutReport, FanOutError>
    where
        W: Worker + ?Sized,
    {
        self.execute(worker).await.into_result()
    }

    fn notify(&self, phase: LifecyclePhase, start: Instant) {
        if let Some(observer) = &self.observer {
            observer.on_phase(phase, start.elapsed());
        }
    }
}

impl fmt::Debug for FanOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanOut")
            .field("plan", &self.plan)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> Option<String> {
    if let Some(message) = panic.downcast_ref::<&str>() {
        Some((*message).to_string())
    } else {
        panic.downcast_ref::<String>().cloned()
    }
}
