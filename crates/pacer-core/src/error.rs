use thiserror::Error;

/// Failures produced by the controller itself.
///
/// Task failures never appear here; they reach the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("queue is full (capacity: {capacity})")]
    QueueFull { capacity: usize },
}

/// Result of racing a task against a deadline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeoutError<E> {
    #[error("operation timed out after {timeout_ms}ms")]
    Elapsed { timeout_ms: u64 },
    #[error("{0}")]
    Task(E),
    /// The spawned task was cancelled before it settled. Nothing in this crate aborts
    /// tasks, so this only happens when the runtime shuts down underneath
    /// [`spawn_with_timeout`](crate::spawn_with_timeout).
    #[error("task cancelled by runtime shutdown")]
    Aborted,
}

impl<E> TimeoutError<E> {
    /// Returns `true` when the deadline fired before the task settled.
    pub fn is_elapsed(&self) -> bool {
        matches!(self, TimeoutError::Elapsed { .. })
    }

    /// The task's own failure, if that is what this error carries.
    pub fn into_task_error(self) -> Option<E> {
        match self {
            TimeoutError::Task(e) => Some(e),
            _ => None,
        }
    }
}
