//! Structured logging with request context.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use edge_core::{InvocationContext, RequestId};
use serde::Serialize;

use crate::sink::{SharedSink, StderrSink};

/// Log level for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trace => write!(f, "TRACE"),
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A structured log entry.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// Log level.
    pub level: LogLevel,
    /// Log message.
    pub message: String,
    /// Request ID for correlation.
    pub request_id: String,
    /// Workload name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload: Option<String>,
    /// Deployed function name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    /// Additional structured fields.
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
    /// Timestamp in microseconds since logger creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_us: Option<u64>,
}

impl LogEntry {
    /// Format as JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }

    /// Format as human-readable string.
    pub fn to_human(&self) -> String {
        let mut s = format!("[{}] {}", self.level, self.message);

        if let Some(elapsed) = self.elapsed_us {
            s.push_str(&format!(" ({}us)", elapsed));
        }

        if !self.fields.is_empty() {
            s.push_str(" | ");
            let fields: Vec<String> = self
                .fields
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            s.push_str(&fields.join(" "));
        }

        s
    }
}

/// Output format for logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON format (for production/log aggregation).
    #[default]
    Json,
    /// Human-readable format (for development).
    Human,
}

/// Structured logger with request context.
///
/// Every entry carries the request ID so log lines from one invocation can
/// be correlated after the host interleaves them with other output.
#[derive(Clone)]
pub struct StructuredLogger {
    request_id: RequestId,
    workload: Option<String>,
    function: Option<String>,
    start_time: std::time::Instant,
    min_level: LogLevel,
    format: LogFormat,
    sink: SharedSink,
}

impl StructuredLogger {
    /// Create a new logger with request context. Logs go to stderr.
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            workload: None,
            function: None,
            start_time: std::time::Instant::now(),
            min_level: LogLevel::Info,
            format: LogFormat::Json,
            sink: Arc::new(StderrSink),
        }
    }

    /// Create a logger from an invocation context.
    pub fn for_invocation(ctx: &InvocationContext) -> Self {
        let logger = Self::new(ctx.request_id.clone());
        match &ctx.function_name {
            Some(name) => logger.with_function(name.clone()),
            None => logger,
        }
    }

    /// Set the workload name.
    pub fn with_workload(mut self, workload: impl Into<String>) -> Self {
        self.workload = Some(workload.into());
        self
    }

    /// Set the deployed function name.
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    /// Set minimum log level.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Redirect output to another sink.
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    /// Log at debug level.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message, BTreeMap::new());
    }

    /// Log at info level.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message, BTreeMap::new());
    }

    /// Log at error level.
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message, BTreeMap::new());
    }

    fn log(&self, level: LogLevel, message: &str, fields: BTreeMap<String, serde_json::Value>) {
        if level < self.min_level {
            return;
        }

        let entry = LogEntry {
            level,
            message: message.to_string(),
            request_id: self.request_id.to_string(),
            workload: self.workload.clone(),
            function: self.function.clone(),
            fields,
            elapsed_us: Some(self.elapsed_us()),
        };

        let output = match self.format {
            LogFormat::Json => entry.to_json(),
            LogFormat::Human => entry.to_human(),
        };

        self.sink.write_line(&output);
    }

    /// Get elapsed time since logger creation.
    pub fn elapsed_us(&self) -> u64 {
        u64::try_from(self.start_time.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}

impl fmt::Debug for StructuredLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredLogger")
            .field("request_id", &self.request_id)
            .field("workload", &self.workload)
            .field("function", &self.function)
            .field("min_level", &self.min_level)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

/// Builder for log entries with fluent API.
pub struct LogBuilder<'a> {
    logger: &'a StructuredLogger,
    level: LogLevel,
    message: String,
    fields: BTreeMap<String, serde_json::Value>,
}

impl<'a> LogBuilder<'a> {
    /// Create a new log builder.
    pub fn new(logger: &'a StructuredLogger, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            logger,
            level,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a string field.
    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields
            .insert(key.to_string(), serde_json::json!(value.into()));
        self
    }

    /// Add an unsigned integer field.
    pub fn field_u64(mut self, key: &str, value: u64) -> Self {
        self.fields.insert(key.to_string(), serde_json::json!(value));
        self
    }

    /// Add a boolean field.
    pub fn field_bool(mut self, key: &str, value: bool) -> Self {
        self.fields.insert(key.to_string(), serde_json::json!(value));
        self
    }

    /// Add a duration field (in milliseconds).
    pub fn duration_ms(mut self, key: &str, duration: std::time::Duration) -> Self {
        self.fields
            .insert(key.to_string(), serde_json::json!(duration.as_millis() as u64));
        self
    }

    /// Emit the log entry.
    pub fn emit(self) {
        self.logger.log(self.level, &self.message, self.fields);
    }
}

impl StructuredLogger {
    /// Start building an info log entry.
    pub fn info_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Info, message)
    }

    /// Start building an error log entry.
    pub fn error_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Error, message)
    }

    /// Start building a debug log entry.
    pub fn debug_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Debug, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use std::time::Duration;

    fn capture() -> (StructuredLogger, MemorySink) {
        let sink = MemorySink::new();
        let logger = StructuredLogger::new(RequestId::from_string("req-42"))
            .with_workload("fanout-counter")
            .with_sink(Arc::new(sink.clone()));
        (logger, sink)
    }

    #[test]
    fn test_json_entry_carries_context() {
        let (logger, sink) = capture();
        logger.info("hello");

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        let value: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(value["level"], "info");
        assert_eq!(value["message"], "hello");
        assert_eq!(value["request_id"], "req-42");
        assert_eq!(value["workload"], "fanout-counter");
        assert!(value.get("function").is_none());
    }

    #[test]
    fn test_min_level_filters() {
        let (logger, sink) = capture();
        logger.debug("hidden");
        logger.info("shown");
        logger.error("shown");
        assert_eq!(sink.len(), 2);

        let logger = logger.with_min_level(LogLevel::Debug);
        logger.debug("now shown");
        assert_eq!(sink.len(), 3);

        let logger = logger.with_min_level(LogLevel::Error);
        logger.info("hidden");
        assert_eq!(sink.len(), 3);
    }

    #[test]
    fn test_builder_fields_are_flattened() {
        let (logger, sink) = capture();
        logger
            .info_builder("done")
            .field_u64("workers", 10)
            .field_bool("ok", true)
            .duration_ms("duration_ms", Duration::from_millis(12))
            .emit();

        let value: serde_json::Value = serde_json::from_str(&sink.lines()[0]).unwrap();
        assert_eq!(value["workers"], 10);
        assert_eq!(value["ok"], true);
        assert_eq!(value["duration_ms"], 12);
    }

    #[test]
    fn test_human_format() {
        let (logger, sink) = capture();
        let logger = logger.with_format(LogFormat::Human);
        logger.error_builder("failed").field("error", "boom").emit();

        let line = &sink.lines()[0];
        assert!(line.starts_with("[ERROR] failed"));
        assert!(line.ends_with(r#"error="boom""#));
    }

    #[test]
    fn test_for_invocation_uses_context() {
        let ctx = InvocationContext::with_request_id(RequestId::from_string("ctx-1"))
            .with_function_name("counter-fn");
        let sink = MemorySink::new();
        let logger = StructuredLogger::for_invocation(&ctx).with_sink(Arc::new(sink.clone()));
        logger.info("x");

        let value: serde_json::Value = serde_json::from_str(&sink.lines()[0]).unwrap();
        assert_eq!(value["request_id"], "ctx-1");
        assert_eq!(value["function"], "counter-fn");
    }
}
