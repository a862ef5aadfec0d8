use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use pacer_model::{BatchConfig, TaskResult};
use tokio::time::sleep;
use tracing::{debug, trace, warn};

use crate::util::as_ms;

/// Run `tasks` in consecutive chunks of `batch_size`.
///
/// Every task of a chunk starts at once; the next chunk starts only after the whole
/// chunk settled and, when `delay` is non-zero, after sleeping for `delay`.
/// No delay follows the final chunk. Results are indexed globally, as in
/// [`concurrent_map`](crate::concurrent_map).
///
/// A `batch_size` of `0` is treated as `1`.
pub async fn batch_execute<I, F, Fut, T, E>(
    tasks: I,
    batch_size: usize,
    delay: Duration,
) -> Vec<TaskResult<T, E>>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if batch_size == 0 {
        warn!("batch size of 0 requested; using 1");
    }
    let batch_size = batch_size.max(1);

    let mut tasks = tasks.into_iter();
    let mut results = Vec::new();
    let mut batch = 0usize;

    loop {
        let chunk: Vec<F> = tasks.by_ref().take(batch_size).collect();
        if chunk.is_empty() {
            break;
        }
        if batch > 0 && !delay.is_zero() {
            trace!(batch, delay_ms = as_ms(delay), "waiting before next batch");
            sleep(delay).await;
        }

        let offset = results.len();
        trace!(batch, offset, size = chunk.len(), "batch started");
        let outcomes = join_all(chunk.into_iter().map(|task| task())).await;
        results.extend(
            outcomes
                .into_iter()
                .enumerate()
                .map(|(i, outcome)| TaskResult::new(offset + i, outcome)),
        );
        batch += 1;
    }

    debug!(batches = batch, total = results.len(), "batch execution finished");
    results
}

/// [`batch_execute`] driven by a [`BatchConfig`].
pub async fn batch_execute_with<I, F, Fut, T, E>(
    tasks: I,
    config: &BatchConfig,
) -> Vec<TaskResult<T, E>>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    batch_execute(tasks, config.batch_size, config.delay()).await
}
