use std::future::Future;
use std::time::Duration;

use pacer_model::RetryPolicy;
use tokio::time::sleep;
use tracing::debug;

use crate::util::as_ms;

/// Invoke `task` until it succeeds, at most `max_retries + 1` times.
///
/// Attempts are separated by a fixed `delay` (no backoff, no jitter); nothing is
/// awaited after the last attempt. When every attempt fails, the failure of the
/// last attempt is returned and earlier ones are discarded.
pub async fn retry<F, Fut, T, E>(mut task: F, max_retries: u32, delay: Duration) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut retries: u32 = 0;
    loop {
        match task().await {
            Ok(value) => return Ok(value),
            Err(err) if retries == max_retries => {
                debug!(attempts = u64::from(retries) + 1, "retries exhausted");
                return Err(err);
            }
            Err(_) => {
                retries += 1;
                debug!(
                    retry = retries,
                    max_retries,
                    delay_ms = as_ms(delay),
                    "attempt failed; retry scheduled"
                );
                if !delay.is_zero() {
                    sleep(delay).await;
                }
            }
        }
    }
}

/// [`retry`] driven by a [`RetryPolicy`].
pub async fn retry_with<F, Fut, T, E>(task: F, policy: &RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    retry(task, policy.max_retries, policy.delay()).await
}
