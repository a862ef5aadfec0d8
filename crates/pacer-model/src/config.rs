use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default concurrency ceiling for a controller.
pub const DEFAULT_LIMIT: usize = 5;
/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default fixed delay between retry attempts.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;
/// Default pause between consecutive batches.
pub const DEFAULT_BATCH_DELAY_MS: u64 = 0;
/// Default deadline for timeout-wrapped tasks.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Construction parameters for a concurrency controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControllerConfig {
    /// Maximum number of tasks in flight. Values below 1 are treated as 1.
    pub limit: usize,
    /// Maximum number of waiting tasks accepted by `try_execute`.
    ///
    /// `None` keeps the queue unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_capacity: Option<usize>,
}

impl ControllerConfig {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Effective ceiling after clamping.
    #[inline]
    pub fn effective_limit(&self) -> usize {
        self.limit.max(1)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            queue_capacity: None,
        }
    }
}

/// Chunking parameters for batch execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchConfig {
    pub batch_size: usize,
    /// Pause between two consecutive batches; never applied after the last one.
    pub delay_ms: u64,
}

impl BatchConfig {
    #[inline]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_LIMIT,
            delay_ms: DEFAULT_BATCH_DELAY_MS,
        }
    }
}

/// Fixed-delay retry policy.
///
/// A task is attempted at most `max_retries + 1` times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay_ms: u64) -> Self {
        Self {
            max_retries,
            delay_ms,
        }
    }

    #[inline]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Total number of attempts including the first one.
    #[inline]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS)
    }
}
