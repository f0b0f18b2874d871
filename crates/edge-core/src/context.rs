//! Invocation request and host-supplied context.

use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lifecycle::TimingContext;

/// Unique request identifier for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        let id = format!(
            "{:x}-{:x}-{:x}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos(),
            std::process::id(),
            next_sequence()
        );
        Self(id)
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

fn next_sequence() -> u32 {
    static SEQUENCE: AtomicU32 = AtomicU32::new(1);
    SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Arbitrary key/value payload handed to a workload by the host.
///
/// Workloads may ignore it entirely; it is never validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationRequest(Map<String, Value>);

impl InvocationRequest {
    /// An empty request (`{}`).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert a value, returning the request for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the request carries no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for InvocationRequest {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Per-invocation metadata supplied by the host runtime.
///
/// Opaque to workload logic: nothing here is read to decide behavior.
/// It carries identifiers for log correlation and a timing context.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    /// Unique request identifier.
    pub request_id: RequestId,
    /// Name the host deployed the function under, if known.
    pub function_name: Option<String>,
    /// Timing context for observability.
    pub timing: TimingContext,
}

impl InvocationContext {
    /// Create a context with a freshly generated request ID.
    pub fn new() -> Self {
        Self::with_request_id(RequestId::generate())
    }

    /// Create a context for a host-assigned request ID.
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            function_name: None,
            timing: TimingContext::new(),
        }
    }

    /// Set the deployed function name.
    pub fn with_function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = Some(name.into());
        self
    }
}

impl Default for InvocationContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_request_id_display() {
        let id = RequestId::from_string("abc-123");
        assert_eq!(id.to_string(), "abc-123");
    }

    #[test]
    fn test_request_accepts_any_object() {
        let request: InvocationRequest =
            serde_json::from_str(r#"{"a": 1, "nested": {"b": [true, null]}}"#).unwrap();
        assert_eq!(request.len(), 2);
        assert_eq!(request.get("a"), Some(&serde_json::json!(1)));
    }

    #[test]
    fn test_empty_request_round_trips_as_object() {
        let request = InvocationRequest::empty();
        assert!(request.is_empty());
        assert_eq!(serde_json::to_string(&request).unwrap(), "{}");
    }

    #[test]
    fn test_request_from_map() {
        let mut map = Map::new();
        map.insert("k".into(), Value::Bool(true));
        let request = InvocationRequest::from(map);
        assert_eq!(request.get("k"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_request_builder() {
        let request = InvocationRequest::empty().with("key", "value");
        assert_eq!(request.get("key"), Some(&serde_json::json!("value")));
    }

    #[test]
    fn test_context_builder() {
        let ctx = InvocationContext::with_request_id(RequestId::from_string("req-1"))
            .with_function_name("fanout-counter");
        assert_eq!(ctx.request_id.0, "req-1");
        assert_eq!(ctx.function_name.as_deref(), Some("fanout-counter"));
    }
}
