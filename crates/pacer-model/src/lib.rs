mod config;
pub use config::{
    BatchConfig, ControllerConfig, DEFAULT_BATCH_DELAY_MS, DEFAULT_LIMIT, DEFAULT_MAX_RETRIES,
    DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_MS, RetryPolicy,
};

mod result;
pub use result::TaskResult;

mod status;
pub use status::TaskStatus;
