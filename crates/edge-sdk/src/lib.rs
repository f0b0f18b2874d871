//! Public SDK for edge platform workloads.
//!
//! This crate re-exports all platform functionality:
//!
//! ```ignore
//! use edge_sdk::prelude::*;
//!
//! struct Hello { manifest: WorkloadManifest }
//!
//! #[async_trait]
//! impl Workload for Hello {
//!     fn manifest(&self) -> &WorkloadManifest {
//!         &self.manifest
//!     }
//!
//!     async fn handle(&self, _req: InvocationRequest, ctx: &InvocationContext) -> WorkloadResponse {
//!         let logger = StructuredLogger::for_invocation(ctx);
//!         logger.info("Handling invocation");
//!
//!         let worker = Arc::new(FnWorker::new(|_| Ok(())));
//!         match FanOut::new(FanOutPlan::fixed()).run(worker).await {
//!             Ok(report) => WorkloadResponse::completed("Rust", 10, 100, report.duration_ms()),
//!             Err(e) => WorkloadResponse::failed(e.message()),
//!         }
//!     }
//! }
//! ```

pub use edge_core;
pub use edge_executor;
pub use edge_observability;

/// Prelude for convenient imports.
pub mod prelude {
    pub use async_trait::async_trait;
    pub use edge_core::*;
    pub use edge_executor::*;
    pub use edge_observability::*;
    pub use std::sync::Arc;
}
