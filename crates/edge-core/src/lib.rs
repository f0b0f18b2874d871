//! Core abstractions for serverless workloads on the edge platform.
//!
//! This crate provides the fundamental types and traits:
//! - `InvocationRequest` / `InvocationContext` - What the host hands a workload
//! - `WorkloadResponse` - The completed/failed response shapes
//! - `FanOutPlan` - Fixed worker and iteration counts
//! - `Workload` trait - Handler interface
//! - `LifecyclePhase` - Invocation lifecycle tracking

mod config;
mod context;
mod envelope;
mod lifecycle;
mod response;
mod workload;

pub use config::*;
pub use context::*;
pub use envelope::*;
pub use lifecycle::*;
pub use response::*;
pub use workload::*;
