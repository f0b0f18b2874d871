//! Observability infrastructure for edge platform workloads.
//!
//! This crate provides:
//! - `LineSink` - Line-atomic output streams shared across workers
//! - `StructuredLogger` - Structured logging with request context
//! - `MetricsCollector` - Per-invocation timing metrics

mod logging;
mod metrics;
mod sink;

pub use logging::*;
pub use metrics::*;
pub use sink::*;

// Re-export RequestId and TimingContext from edge-core for convenience
pub use edge_core::{RequestId, TimingContext};
