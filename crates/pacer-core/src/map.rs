use std::future::Future;

use futures::future::join_all;
use pacer_model::TaskResult;
use tracing::debug;

use crate::controller::Controller;

impl Controller {
    /// Submit every task in iteration order and wait until all of them settle.
    ///
    /// Failures are captured as [`TaskResult::Rejected`]; this never short-circuits.
    /// The output has one entry per task, at the task's original index.
    pub async fn execute_all<I, F, Fut, T, E>(&self, tasks: I) -> Vec<TaskResult<T, E>>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let pending: Vec<_> = tasks.into_iter().map(|task| self.execute(task)).collect();
        let total = pending.len();

        let results: Vec<_> = join_all(pending)
            .await
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| TaskResult::new(index, outcome))
            .collect();

        let failed = results.iter().filter(|r| r.is_rejected()).count();
        debug!(total, failed, limit = self.limit(), "all tasks settled");
        results
    }
}

/// Run `tasks` through a fresh [`Controller`] with the given ceiling.
pub async fn concurrent_map<I, F, Fut, T, E>(tasks: I, limit: usize) -> Vec<TaskResult<T, E>>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    Controller::new(limit).execute_all(tasks).await
}
