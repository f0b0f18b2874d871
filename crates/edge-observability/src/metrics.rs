//! Per-invocation timing metrics.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use edge_core::RequestId;
use serde::{Deserialize, Serialize};

/// Platform metrics for a single invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationMetrics {
    /// Request ID for correlation.
    pub request_id: String,
    /// Workload name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload: Option<String>,
    /// Per-worker timings, keyed by worker index.
    pub workers: BTreeMap<usize, WorkerMetrics>,
    /// Lines written to the output stream during the invocation.
    pub lines: u64,
    /// Time from collector creation to fan-in (microseconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_in_us: Option<u64>,
    /// Total invocation duration (microseconds).
    pub total_duration_us: u64,
    /// Response status (`completed` / `failed`).
    pub status: String,
}

/// Metrics for a single worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerMetrics {
    /// Worker index.
    pub index: usize,
    /// Worker run time (microseconds).
    pub duration_us: u64,
    /// Whether the worker succeeded.
    pub success: bool,
    /// Error message if failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Collector for invocation metrics.
#[derive(Debug)]
pub struct MetricsCollector {
    request_id: RequestId,
    workload: Option<String>,
    start: Instant,
    fan_in: Option<Instant>,
    workers: BTreeMap<usize, WorkerMetrics>,
    lines: u64,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            workload: None,
            start: Instant::now(),
            fan_in: None,
            workers: BTreeMap::new(),
            lines: 0,
        }
    }

    /// Set workload name.
    pub fn set_workload(&mut self, workload: impl Into<String>) {
        self.workload = Some(workload.into());
    }

    /// Record that the fan-in barrier released.
    pub fn record_fan_in(&mut self) {
        self.fan_in = Some(Instant::now());
    }

    /// Record a finished worker.
    pub fn record_worker(&mut self, index: usize, duration: Duration, error: Option<String>) {
        self.workers.insert(
            index,
            WorkerMetrics {
                index,
                duration_us: as_micros(duration),
                success: error.is_none(),
                error,
            },
        );
    }

    /// Record how many lines reached the output stream.
    pub fn record_lines(&mut self, lines: u64) {
        self.lines = lines;
    }

    /// Finalize and return the metrics.
    pub fn finalize(self, status: impl Into<String>) -> InvocationMetrics {
        let start = self.start;
        InvocationMetrics {
            request_id: self.request_id.to_string(),
            workload: self.workload,
            workers: self.workers,
            lines: self.lines,
            fan_in_us: self.fan_in.map(|t| as_micros(t.duration_since(start))),
            total_duration_us: as_micros(start.elapsed()),
            status: status.into(),
        }
    }
}

fn as_micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

impl InvocationMetrics {
    /// Number of workers that failed.
    pub fn failed_workers(&self) -> usize {
        self.workers.values().filter(|w| !w.success).count()
    }

    /// Format as JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Format as human-readable summary.
    pub fn to_summary(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Invocation: {} [{}]", self.request_id, self.status));

        if let Some(fan_in) = self.fan_in_us {
            lines.push(format!(
                "  Fan-in: {}us ({:.2}ms)",
                fan_in,
                fan_in as f64 / 1000.0
            ));
        }

        lines.push(format!(
            "  Total: {}us ({:.2}ms), {} lines",
            self.total_duration_us,
            self.total_duration_us as f64 / 1000.0,
            self.lines
        ));

        if !self.workers.is_empty() {
            lines.push("  Workers:".to_string());
            for worker in self.workers.values() {
                let status = match &worker.error {
                    Some(e) => format!("FAILED: {}", e),
                    None => "ok".to_string(),
                };
                lines.push(format!(
                    "    {}: {}us ({:.2}ms) - {}",
                    worker.index,
                    worker.duration_us,
                    worker.duration_us as f64 / 1000.0,
                    status
                ));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_workers() {
        let mut collector = MetricsCollector::new(RequestId::from_string("r"));
        collector.set_workload("fanout-counter");
        collector.record_worker(1, Duration::from_micros(30), None);
        collector.record_worker(0, Duration::from_micros(20), None);
        collector.record_lines(200);
        collector.record_fan_in();

        let metrics = collector.finalize("completed");
        assert_eq!(metrics.workers.len(), 2);
        assert_eq!(metrics.lines, 200);
        assert!(metrics.to_summary().contains("200 lines"));
        assert_eq!(metrics.failed_workers(), 0);
        assert!(metrics.fan_in_us.is_some());
        assert_eq!(metrics.workers.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_failed_worker_in_summary() {
        let mut collector = MetricsCollector::new(RequestId::from_string("r"));
        collector.record_worker(3, Duration::ZERO, Some("boom".into()));

        let metrics = collector.finalize("failed");
        assert_eq!(metrics.failed_workers(), 1);
        let summary = metrics.to_summary();
        assert!(summary.contains("[failed]"));
        assert!(summary.contains("FAILED: boom"));
    }

    #[test]
    fn test_json_round_trip_fields() {
        let metrics = MetricsCollector::new(RequestId::from_string("r")).finalize("completed");
        let value: serde_json::Value = serde_json::from_str(&metrics.to_json()).unwrap();
        assert_eq!(value["status"], "completed");
        assert!(value.get("workload").is_none());
        assert!(value.get("fan_in_us").is_none());
        assert_eq!(value["lines"], 0);
    }
}
