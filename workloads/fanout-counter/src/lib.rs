//! Reference workload demonstrating concurrent fan-out on the edge platform.
//!
//! Each invocation:
//! - Launches ten concurrent workers, each printing one hundred numbered lines
//! - Waits for all of them at a single fan-in barrier
//! - Returns a `completed` response with the elapsed time, or a `failed`
//!   response carrying the first worker error
//!
//! The request and context are accepted but never inspected.

mod worker;

use std::sync::Arc;

use async_trait::async_trait;
use edge_sdk::prelude::*;

pub use worker::{count_line, CountingWorker};

/// Name this workload is deployed under.
pub const WORKLOAD_NAME: &str = "fanout-counter";

/// Language reported in completed responses; shared with the JVM handler's
/// response contract.
pub const LANGUAGE: &str = "Kotlin";

/// Builds the worker unit for one invocation, given the sink its lines
/// must go to.
pub type WorkerFactory = Arc<dyn Fn(SharedSink) -> Arc<dyn Worker> + Send + Sync>;

/// The fan-out counter workload.
pub struct FanOutCounter {
    manifest: WorkloadManifest,
    plan: FanOutPlan,
    output: SharedSink,
    worker: WorkerFactory,
    log_sink: SharedSink,
    log_format: LogFormat,
    min_level: LogLevel,
    observer: Option<Arc<dyn LifecycleObserver>>,
}

impl FanOutCounter {
    /// Create the workload: worker lines go to stdout, logs to stderr.
    pub fn new() -> Self {
        Self::with_output(Arc::new(StdoutSink))
    }

    /// Create the workload with worker lines written to `output`.
    pub fn with_output(output: SharedSink) -> Self {
        let plan = FanOutPlan::fixed();
        Self {
            manifest: WorkloadManifest::new(WORKLOAD_NAME, env!("CARGO_PKG_VERSION"), LANGUAGE),
            plan,
            output,
            worker: Arc::new(move |sink: SharedSink| -> Arc<dyn Worker> {
                Arc::new(CountingWorker::new(plan.iterations, sink))
            }),
            log_sink: Arc::new(StderrSink),
            log_format: LogFormat::Json,
            min_level: LogLevel::Info,
            observer: None,
        }
    }

    /// Replace the worker unit. The plan stays fixed.
    ///
    /// `factory` runs once per invocation and receives the output sink;
    /// lines the worker writes there are counted in the invocation metrics.
    pub fn with_worker<F>(mut self, factory: F) -> Self
    where
        F: Fn(SharedSink) -> Arc<dyn Worker> + Send + Sync + 'static,
    {
        self.worker = Arc::new(factory);
        self
    }

    /// Send request logs to another sink.
    pub fn with_log_sink(mut self, sink: SharedSink) -> Self {
        self.log_sink = sink;
        self
    }

    /// Set log format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    /// Set minimum log level.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Report lifecycle phases to an observer.
    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The plan every invocation runs.
    pub fn plan(&self) -> FanOutPlan {
        self.plan
    }

    /// Handle an invocation from synchronous code.
    ///
    /// Builds a multi-thread runtime for the duration of the call. When the
    /// caller is already inside a tokio runtime, that runtime's thread cannot
    /// block on another one, so the invocation runs on a scoped OS thread.
    pub fn handle_blocking(
        &self,
        request: InvocationRequest,
        ctx: &InvocationContext,
    ) -> WorkloadResponse {
        if tokio::runtime::Handle::try_current().is_err() {
            return self.block_on_new_runtime(request, ctx);
        }

        let joined = std::thread::scope(|scope| {
            scope
                .spawn(move || self.block_on_new_runtime(request, ctx))
                .join()
        });
        joined.unwrap_or_else(|_| {
            self.runtime_failure(
                ctx,
                FanOutError::Runtime {
                    message: Some("invocation thread panicked".to_string()),
                },
            )
        })
    }

    fn block_on_new_runtime(
        &self,
        request: InvocationRequest,
        ctx: &InvocationContext,
    ) -> WorkloadResponse {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build();

        match runtime {
            Ok(runtime) => runtime.block_on(self.invoke(request, ctx)),
            Err(e) => self.runtime_failure(ctx, FanOutError::from(e)),
        }
    }

    fn runtime_failure(&self, ctx: &InvocationContext, err: FanOutError) -> WorkloadResponse {
        self.logger(ctx)
            .error_builder("Runtime unavailable")
            .field("error", err.to_string())
            .emit();
        WorkloadResponse::failed(err.message())
    }

    /// Handle one invocation.
    pub async fn invoke(
        &self,
        _request: InvocationRequest,
        ctx: &InvocationContext,
    ) -> WorkloadResponse {
        let logger = self.logger(ctx);
        let mut metrics = MetricsCollector::new(ctx.request_id.clone());
        metrics.set_workload(WORKLOAD_NAME);

        self.notify(LifecyclePhase::Start, ctx);
        logger
            .info_builder("Invocation started")
            .field_u64("workers", self.plan.workers as u64)
            .field_u64("iterations", u64::from(self.plan.iterations))
            .field_u64("expected_lines", self.plan.total_lines())
            .emit();

        let mut fan_out = FanOut::new(self.plan);
        if let Some(observer) = &self.observer {
            fan_out = fan_out.with_observer(Arc::clone(observer));
        }

        let output = Arc::new(CountingSink::new(Arc::clone(&self.output)));
        let sink: SharedSink = output.clone();
        let worker = (self.worker)(sink);

        let report = fan_out.execute(worker).await;
        metrics.record_fan_in();
        metrics.record_lines(output.count());
        for outcome in &report.outcomes {
            let error = match &outcome.status {
                WorkerStatus::Completed => None,
                WorkerStatus::Failed(message) | WorkerStatus::Panicked(message) => {
                    Some(message.clone().unwrap_or_else(|| UNKNOWN_ERROR.to_string()))
                }
                WorkerStatus::Aborted => Some("aborted".to_string()),
            };
            metrics.record_worker(outcome.index, outcome.elapsed, error);
        }

        let response = match report.into_result() {
            Ok(report) => {
                logger
                    .info_builder("Fan-out complete")
                    .field_u64("duration_ms", report.duration_ms())
                    .emit();
                self.notify(LifecyclePhase::Completion, ctx);
                WorkloadResponse::completed(
                    self.manifest.language.clone(),
                    report.plan.workers,
                    report.plan.iterations,
                    report.duration_ms(),
                )
            }
            Err(err) => {
                logger
                    .error_builder("Fan-out failed")
                    .field("error", err.to_string())
                    .emit();
                self.notify(
                    LifecyclePhase::Error(err.response_message().to_string()),
                    ctx,
                );
                WorkloadResponse::failed(err.message())
            }
        };

        let metrics = metrics.finalize(response.status());
        logger
            .debug_builder("Invocation metrics")
            .field_u64("total_duration_us", metrics.total_duration_us)
            .field_u64("lines", metrics.lines)
            .field_u64("failed_workers", metrics.failed_workers() as u64)
            .emit();

        response
    }

    fn logger(&self, ctx: &InvocationContext) -> StructuredLogger {
        StructuredLogger::for_invocation(ctx)
            .with_workload(WORKLOAD_NAME)
            .with_format(self.log_format)
            .with_min_level(self.min_level)
            .with_sink(Arc::clone(&self.log_sink))
    }

    fn notify(&self, phase: LifecyclePhase, ctx: &InvocationContext) {
        if let Some(observer) = &self.observer {
            observer.on_phase(phase, ctx.timing.elapsed());
        }
    }
}

impl Default for FanOutCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Workload for FanOutCounter {
    fn manifest(&self) -> &WorkloadManifest {
        &self.manifest
    }

    async fn handle(
        &self,
        request: InvocationRequest,
        ctx: &InvocationContext,
    ) -> WorkloadResponse {
        self.invoke(request, ctx).await
    }
}

/// Entry point for hosts: run the fixed fan-out with worker lines on stdout.
pub fn handle_request(request: InvocationRequest, ctx: &InvocationContext) -> WorkloadResponse {
    FanOutCounter::new().handle_blocking(request, ctx)
}
