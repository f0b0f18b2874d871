//! Fan-out failure types.

use edge_core::UNKNOWN_ERROR;
use thiserror::Error;

/// Error returned by a single worker.
///
/// The message is optional: a worker may fail without saying why.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .message.as_deref().unwrap_or("worker failed"))]
pub struct WorkerError {
    message: Option<String>,
}

impl WorkerError {
    /// Create an error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// Create an error that carries no message.
    pub fn silent() -> Self {
        Self { message: None }
    }

    /// The message, if one was given and it is not blank.
    pub fn message(&self) -> Option<&str> {
        non_blank(self.message.as_deref())
    }
}

impl From<anyhow::Error> for WorkerError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<std::io::Error> for WorkerError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Unexpected failure during fan-out or join.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FanOutError {
    /// A worker returned an error or panicked.
    #[error("worker {index} failed: {}", .message.as_deref().unwrap_or(UNKNOWN_ERROR))]
    Worker {
        index: usize,
        message: Option<String>,
    },

    /// A worker task was torn down before it could report.
    #[error("worker {index} did not complete: {}", .message.as_deref().unwrap_or(UNKNOWN_ERROR))]
    Join {
        index: usize,
        message: Option<String>,
    },

    /// The async runtime could not be started.
    #[error("runtime unavailable: {}", .message.as_deref().unwrap_or(UNKNOWN_ERROR))]
    Runtime { message: Option<String> },
}

impl FanOutError {
    /// The underlying message, without the worker prefix. `None` when the
    /// failure carried no message or only whitespace.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Worker { message, .. }
            | Self::Join { message, .. }
            | Self::Runtime { message } => non_blank(message.as_deref()),
        }
    }

    /// The message to report to the caller, falling back to
    /// [`UNKNOWN_ERROR`].
    pub fn response_message(&self) -> &str {
        self.message().unwrap_or(UNKNOWN_ERROR)
    }

    /// Index of the worker that failed, if the failure came from one.
    pub fn worker_index(&self) -> Option<usize> {
        match self {
            Self::Worker { index, .. } | Self::Join { index, .. } => Some(*index),
            Self::Runtime { .. } => None,
        }
    }
}

impl From<std::io::Error> for FanOutError {
    fn from(err: std::io::Error) -> Self {
        FanOutError::Runtime {
            message: Some(err.to_string()),
        }
    }
}

fn non_blank(message: Option<&str>) -> Option<&str> {
    message.filter(|m| !m.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_error_message() {
        assert_eq!(WorkerError::new("boom").message(), Some("boom"));
        assert_eq!(WorkerError::silent().message(), None);
        assert_eq!(WorkerError::new("").message(), None);
    }

    #[test]
    fn test_worker_error_display() {
        assert_eq!(WorkerError::new("boom").to_string(), "boom");
        assert_eq!(WorkerError::silent().to_string(), "worker failed");
    }

    #[test]
    fn test_worker_error_from_anyhow() {
        let err: WorkerError = anyhow::anyhow!("disk full").into();
        assert_eq!(err.message(), Some("disk full"));
    }

    #[test]
    fn test_fan_out_error_messages() {
        let err = FanOutError::Worker {
            index: 3,
            message: Some("boom".into()),
        };
        assert_eq!(err.message(), Some("boom"));
        assert_eq!(err.response_message(), "boom");
        assert_eq!(err.to_string(), "worker 3 failed: boom");
        assert_eq!(err.worker_index(), Some(3));
    }

    #[test]
    fn test_fan_out_error_fallback() {
        let err = FanOutError::Join {
            index: 0,
            message: None,
        };
        assert_eq!(err.message(), None);
        assert_eq!(err.response_message(), "Unknown error");
        assert_eq!(err.to_string(), "worker 0 did not complete: Unknown error");
    }

    #[test]
    fn test_runtime_error_from_io() {
        let err: FanOutError = std::io::Error::new(std::io::ErrorKind::Other, "no threads").into();
        assert_eq!(err.response_message(), "no threads");
        assert_eq!(err.worker_index(), None);
    }
}
