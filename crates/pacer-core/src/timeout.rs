//! Deadline wrappers.
//!
//! Two flavours with different fates for the losing task:
//! - [`with_timeout`] races the task in place. On timeout the task's future is dropped,
//!   so it stops at its next suspension point.
//! - [`spawn_with_timeout`] runs the task on the tokio runtime. On timeout the caller
//!   returns right away while the task keeps running; its [`CancellationToken`] is
//!   cancelled so it can wind down on its own terms. It is never force-aborted.
use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::TimeoutError;
use crate::util::as_ms;

/// Settle with the task's outcome, or fail with [`TimeoutError::Elapsed`] if `timeout` passes first.
pub async fn with_timeout<F, Fut, T, E>(task: F, timeout: Duration) -> Result<T, TimeoutError<E>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(timeout, task()).await {
        Ok(outcome) => outcome.map_err(TimeoutError::Task),
        Err(_) => {
            let timeout_ms = as_ms(timeout);
            warn!(timeout_ms, "task exceeded its timeout; dropped");
            Err(TimeoutError::Elapsed { timeout_ms })
        }
    }
}

/// Spawn the task and wait for it at most `timeout`.
///
/// The task receives a [`CancellationToken`] which is cancelled when the deadline fires.
/// A panic inside the task is resumed on the caller. If the runtime shuts down
/// before the task settles, [`TimeoutError::Aborted`] is returned.
pub async fn spawn_with_timeout<F, Fut, T, E>(
    task: F,
    timeout: Duration,
) -> Result<T, TimeoutError<E>>
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let token = CancellationToken::new();
    let mut handle = tokio::spawn(task(token.clone()));

    match tokio::time::timeout(timeout, &mut handle).await {
        Ok(Ok(outcome)) => outcome.map_err(TimeoutError::Task),
        Ok(Err(join)) if join.is_panic() => std::panic::resume_unwind(join.into_panic()),
        // Nothing aborts the handle; a non-panic join error means the runtime shut down.
        Ok(Err(_)) => Err(TimeoutError::Aborted),
        Err(_) => {
            let timeout_ms = as_ms(timeout);
            token.cancel();
            warn!(timeout_ms, "task exceeded its timeout; left running with cancellation requested");
            Err(TimeoutError::Elapsed { timeout_ms })
        }
    }
}
