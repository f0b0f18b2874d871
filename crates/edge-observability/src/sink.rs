//! Line-oriented output sinks.
//!
//! Every write is a whole line. Concurrent writers may interleave lines but
//! never bytes within a line.

use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Destination for complete lines of output.
pub trait LineSink: Send + Sync {
    /// Write one line. The sink appends the newline.
    fn write_line(&self, line: &str);
}

/// Writes lines to standard output under the stdout lock.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl LineSink for StdoutSink {
    fn write_line(&self, line: &str) {
        let mut out = std::io::stdout().lock();
        // A closed stdout has nowhere to report to.
        let _ = writeln!(out, "{}", line);
    }
}

/// Writes lines to standard error under the stderr lock.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

impl LineSink for StderrSink {
    fn write_line(&self, line: &str) {
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "{}", line);
    }
}

/// Captures lines in memory. Clones share the same buffer.
#[derive(Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every line written so far, in write order.
    pub fn lines(&self) -> Vec<String> {
        self.guard().clone()
    }

    /// Number of lines written so far.
    pub fn len(&self) -> usize {
        self.guard().len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<String>> {
        // A writer that panicked mid-push leaves a valid Vec behind.
        self.lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LineSink for MemorySink {
    fn write_line(&self, line: &str) {
        self.guard().push(line.to_string());
    }
}

impl fmt::Debug for MemorySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySink").field("lines", &self.len()).finish()
    }
}

/// Shared, type-erased sink handle.
pub type SharedSink = Arc<dyn LineSink>;

/// Forwards lines to another sink and counts them.
pub struct CountingSink {
    inner: SharedSink,
    count: AtomicU64,
}

impl CountingSink {
    /// Wrap `inner`, starting the count at zero.
    pub fn new(inner: SharedSink) -> Self {
        Self {
            inner,
            count: AtomicU64::new(0),
        }
    }

    /// Lines forwarded so far.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl LineSink for CountingSink {
    fn write_line(&self, line: &str) {
        self.inner.write_line(line);
        self.count.fetch_add(1, Ordering::Relaxed);
    }
}

impl fmt::Debug for CountingSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountingSink")
            .field("count", &self.count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_memory_sink_preserves_order() {
        let sink = MemorySink::new();
        sink.write_line("a");
        sink.write_line("b");
        assert_eq!(sink.lines(), vec!["a", "b"]);
    }

    #[test]
    fn test_memory_sink_clones_share_buffer() {
        let sink = MemorySink::new();
        let other = sink.clone();
        other.write_line("shared");
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_memory_sink_starts_empty() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());
        sink.write_line("x");
        assert!(!sink.is_empty());
    }

    #[test]
    fn test_concurrent_writes_keep_lines_whole() {
        let sink = MemorySink::new();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let sink = sink.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        sink.write_line(&format!("writer {}: {}", t, i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let lines = sink.lines();
        assert_eq!(lines.len(), 400);
        assert!(lines.iter().all(|l| l.starts_with("writer ")));
    }

    #[test]
    fn test_counting_sink_forwards_and_counts() {
        let memory = MemorySink::new();
        let counting = Arc::new(CountingSink::new(Arc::new(memory.clone())));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let sink: SharedSink = counting.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        sink.write_line(&format!("writer {}: {}", t, i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counting.count(), 100);
        assert_eq!(memory.len(), 100);
    }
}
