//! Workload definition and trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::{InvocationContext, InvocationRequest};
use crate::response::WorkloadResponse;

/// Workload manifest - explicit configuration for a deployable unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadManifest {
    /// Unique name for this workload.
    pub name: String,
    /// Semantic version.
    pub version: String,
    /// Language reported in completed responses.
    pub language: String,
}

impl WorkloadManifest {
    /// Create a new workload manifest.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            language: language.into(),
        }
    }
}

/// A handler the host invokes once per request.
///
/// Implementations never fail: every error is folded into
/// [`WorkloadResponse::Failed`].
#[async_trait]
pub trait Workload: Send + Sync {
    /// Describe the deployable unit.
    fn manifest(&self) -> &WorkloadManifest;

    /// Handle one invocation.
    async fn handle(
        &self,
        request: InvocationRequest,
        ctx: &InvocationContext,
    ) -> WorkloadResponse;
}
