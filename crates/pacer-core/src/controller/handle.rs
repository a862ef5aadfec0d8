use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::task::JoinHandle;

/// Completion handle of a task started with [`Controller::spawn`](crate::Controller::spawn).
///
/// The task runs on the tokio runtime whether or not this handle is awaited, so
/// handles may be awaited in any order. Dropping the handle detaches the task; it
/// keeps its slot until it settles.
///
/// # Panics
///
/// Awaiting resumes a panic raised by the task. It also panics if the runtime
/// shut down before the task settled.
pub struct TaskHandle<T, E> {
    inner: JoinHandle<Result<T, E>>,
}

impl<T, E> TaskHandle<T, E> {
    pub(crate) fn new(inner: JoinHandle<Result<T, E>>) -> Self {
        Self { inner }
    }

    /// Returns `true` once the task has settled.
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

impl<T, E> Future for TaskHandle<T, E> {
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match ready!(Pin::new(&mut self.inner).poll(cx)) {
            Ok(outcome) => Poll::Ready(outcome),
            Err(join) if join.is_panic() => std::panic::resume_unwind(join.into_panic()),
            Err(join) => panic!("controller task cancelled before settling: {join}"),
        }
    }
}
