use serde::{Deserialize, Serialize};

use crate::TaskStatus;

/// Outcome of one task, addressed by its position in the submitted sequence.
///
/// Concurrent helpers complete tasks out of order; `index` always refers to the
/// original position so the caller can address results positionally.
/// Serialised with a `status` tag:
///
/// ```json
/// { "status": "fulfilled", "index": 0, "value": 42 }
/// { "status": "rejected", "index": 1, "reason": "boom" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TaskResult<T, E> {
    Fulfilled { index: usize, value: T },
    Rejected { index: usize, reason: E },
}

impl<T, E> TaskResult<T, E> {
    pub fn new(index: usize, outcome: Result<T, E>) -> Self {
        match outcome {
            Ok(value) => TaskResult::Fulfilled { index, value },
            Err(reason) => TaskResult::Rejected { index, reason },
        }
    }

    pub fn index(&self) -> usize {
        match self {
            TaskResult::Fulfilled { index, .. } | TaskResult::Rejected { index, .. } => *index,
        }
    }

    pub fn status(&self) -> TaskStatus {
        match self {
            TaskResult::Fulfilled { .. } => TaskStatus::Fulfilled,
            TaskResult::Rejected { .. } => TaskStatus::Rejected,
        }
    }

    pub fn is_fulfilled(&self) -> bool {
        self.status().is_fulfilled()
    }

    pub fn is_rejected(&self) -> bool {
        !self.is_fulfilled()
    }

    /// Value of a fulfilled task, `None` when rejected.
    pub fn value(&self) -> Option<&T> {
        match self {
            TaskResult::Fulfilled { value, .. } => Some(value),
            TaskResult::Rejected { .. } => None,
        }
    }

    /// Failure of a rejected task, `None` when fulfilled.
    pub fn reason(&self) -> Option<&E> {
        match self {
            TaskResult::Fulfilled { .. } => None,
            TaskResult::Rejected { reason, .. } => Some(reason),
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            TaskResult::Fulfilled { value, .. } => Ok(value),
            TaskResult::Rejected { reason, .. } => Err(reason),
        }
    }
}
