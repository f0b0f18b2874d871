//! Workload response shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message used when a failure carries no message of its own.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Status value of a completed response.
pub const STATUS_COMPLETED: &str = "completed";

/// Status value of a failed response.
pub const STATUS_FAILED: &str = "failed";

/// Response returned to the host for every invocation.
///
/// Serializes as a flat object whose `status` key selects the shape, so a
/// response is always exactly one of the two and never a mix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum WorkloadResponse {
    /// All workers finished.
    Completed {
        /// Implementation language reported to the host.
        language: String,
        /// Number of workers launched.
        coroutines: usize,
        /// Iterations each worker performed.
        count_per_coroutine: u32,
        /// Wall-clock time from fan-out to join, in milliseconds.
        duration_ms: u64,
    },
    /// The fan-out failed.
    Failed {
        /// Human-readable failure message, never empty.
        error: String,
    },
}

impl WorkloadResponse {
    /// Build a completed response.
    pub fn completed(
        language: impl Into<String>,
        coroutines: usize,
        count_per_coroutine: u32,
        duration_ms: u64,
    ) -> Self {
        Self::Completed {
            language: language.into(),
            coroutines,
            count_per_coroutine,
            duration_ms,
        }
    }

    /// Build a failed response. Absent or blank messages become
    /// [`UNKNOWN_ERROR`].
    pub fn failed(message: Option<&str>) -> Self {
        let error = match message {
            Some(m) if !m.trim().is_empty() => m.to_string(),
            _ => UNKNOWN_ERROR.to_string(),
        };
        Self::Failed { error }
    }

    /// The `status` value of this response.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Completed { .. } => STATUS_COMPLETED,
            Self::Failed { .. } => STATUS_FAILED,
        }
    }

    /// Check if the response is the completed shape.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// The failure message, if this is the failed shape.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            Self::Completed { .. } => None,
        }
    }

    /// Format as JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"error":"{}","status":"{}"}}"#, UNKNOWN_ERROR, STATUS_FAILED)
        })
    }

    /// Convert into the string-keyed map hosts expect.
    pub fn into_map(self) -> Map<String, Value> {
        let mut map = Map::new();
        match self {
            Self::Completed {
                language,
                coroutines,
                count_per_coroutine,
                duration_ms,
            } => {
                map.insert("language".into(), Value::from(language));
                map.insert("coroutines".into(), Value::from(coroutines));
                map.insert("count_per_coroutine".into(), Value::from(count_per_coroutine));
                map.insert("duration_ms".into(), Value::from(duration_ms));
                map.insert("status".into(), Value::from(STATUS_COMPLETED));
            }
            Self::Failed { error } => {
                map.insert("error".into(), Value::from(error));
                map.insert("status".into(), Value::from(STATUS_FAILED));
            }
        }
        map
    }
}
