use serde::{Deserialize, Serialize};

/// Final state of a task run through one of the settle-all helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    /// Task produced a value.
    Fulfilled,
    /// Task failed; the failure is kept as data.
    Rejected,
}

impl TaskStatus {
    /// Returns `true` for [`TaskStatus::Fulfilled`].
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, TaskStatus::Fulfilled)
    }

    /// Short lowercase label, intended for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Fulfilled => "fulfilled",
            TaskStatus::Rejected => "rejected",
        }
    }
}
