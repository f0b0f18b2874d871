//! Worker units.

use std::fmt;

use async_trait::async_trait;

use crate::error::WorkerError;

/// One independent unit of work in a fan-out.
///
/// The same worker value is shared by every spawned task; `index` tells the
/// task which unit it is. Workers must not rely on shared mutable state.
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Run unit `index` to completion.
    async fn run(&self, index: usize) -> Result<(), WorkerError>;
}

/// Adapts a synchronous closure into a [`Worker`].
pub struct FnWorker<F> {
    f: F,
}

impl<F> FnWorker<F>
where
    F: Fn(usize) -> Result<(), WorkerError> + Send + Sync + 'static,
{
    /// Wrap a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> Worker for FnWorker<F>
where
    F: Fn(usize) -> Result<(), WorkerError> + Send + Sync + 'static,
{
    async fn run(&self, index: usize) -> Result<(), WorkerError> {
        (self.f)(index)
    }
}

impl<F> fmt::Debug for FnWorker<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnWorker").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fn_worker_runs_closure() {
        let worker = FnWorker::new(|index| {
            if index == 2 {
                Err(WorkerError::new("two"))
            } else {
                Ok(())
            }
        });

        assert!(worker.run(0).await.is_ok());
        assert_eq!(worker.run(2).await, Err(WorkerError::new("two")));
    }
}
