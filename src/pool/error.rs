//! Worker pool error types.

use std::fmt;

/// Errors surfaced by result-channel submissions.
///
/// The fire-and-forget `submit` never returns these; rejection there is
/// silent and observable only through `is_accepting`/`pending_count`.
#[derive(Debug, Clone)]
pub enum PoolError {
    /// The pool is not running (never initialized, or shutting down).
    NotRunning,

    /// The admission gate was closed: the pool is draining, or a task from
    /// the previous draining phase is still executing.
    Rejected,

    /// The task panicked while executing.
    WorkerPanic(String),

    /// The task never produced a result; it was discarded by an immediate
    /// terminate before a worker picked it up.
    ChannelClosed,
}

impl PoolError {
    /// Check if this is a gate rejection.
    pub fn is_rejected(&self) -> bool {
        matches!(self, PoolError::Rejected)
    }

    /// Check if this is a not-running error.
    pub fn is_not_running(&self) -> bool {
        matches!(self, PoolError::NotRunning)
    }

    /// Check if this is a worker panic.
    pub fn is_worker_panic(&self) -> bool {
        matches!(self, PoolError::WorkerPanic(_))
    }

    /// Get the error message for logging.
    pub fn message(&self) -> &str {
        match self {
            PoolError::NotRunning => "Pool not running",
            PoolError::Rejected => "Submission rejected",
            PoolError::WorkerPanic(msg) => msg,
            PoolError::ChannelClosed => "Result channel closed",
        }
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::NotRunning => {
                write!(f, "pool is not running")
            }
            PoolError::Rejected => {
                write!(f, "submission rejected: admission gate is closed")
            }
            PoolError::WorkerPanic(msg) => {
                write!(f, "task panicked: {}", msg)
            }
            PoolError::ChannelClosed => {
                write!(f, "task was discarded before producing a result")
            }
        }
    }
}

impl std::error::Error for PoolError {}

/// Result type alias for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
