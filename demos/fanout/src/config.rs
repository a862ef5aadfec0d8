use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use pacer_model::{BatchConfig, ControllerConfig, DEFAULT_TIMEOUT_MS, RetryPolicy};
use serde::Deserialize;

/// Settings for one demo run; every section falls back to library defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DemoConfig {
    pub jobs: usize,
    pub controller: ControllerConfig,
    pub batch: BatchConfig,
    pub retry: RetryPolicy,
    pub timeout_ms: u64,
}

impl DemoConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            jobs: 12,
            controller: ControllerConfig::new(3).with_queue_capacity(4),
            batch: BatchConfig {
                batch_size: 4,
                delay_ms: 50,
            },
            retry: RetryPolicy::new(3, 25),
            timeout_ms: DEFAULT_TIMEOUT_MS / 100,
        }
    }
}
