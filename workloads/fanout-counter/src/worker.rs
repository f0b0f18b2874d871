//! The counting worker: one line per iteration.

use async_trait::async_trait;
use edge_sdk::edge_executor::{Worker, WorkerError};
use edge_sdk::edge_observability::SharedSink;

/// Format the line worker `index` emits on iteration `iteration`.
pub fn count_line(index: usize, iteration: u32) -> String {
    format!("Coroutine {}: {}", index, iteration)
}

/// Emits `Coroutine {index}: {i}` for `i` in `1..=iterations`, in order.
#[derive(Clone)]
pub struct CountingWorker {
    iterations: u32,
    sink: SharedSink,
}

impl CountingWorker {
    /// Create a worker that writes to `sink`.
    pub fn new(iterations: u32, sink: SharedSink) -> Self {
        Self { iterations, sink }
    }

    /// Iterations each unit performs.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

#[async_trait]
impl Worker for CountingWorker {
    async fn run(&self, index: usize) -> Result<(), WorkerError> {
        for i in 1..=self.iterations {
            self.sink.write_line(&count_line(index, i));
        }
        Ok(())
    }
}

impl std::fmt::Debug for CountingWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountingWorker")
            .field("iterations", &self.iterations)
            .finish_non_exhaustive()
    }
}
