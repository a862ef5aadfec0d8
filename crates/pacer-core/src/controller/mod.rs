//! Bounded-concurrency task controller.
//!
//! A [`Controller`] admits asynchronous tasks against a fixed ceiling:
//! - while fewer than `limit` tasks hold a slot, a new task starts right away;
//! - otherwise it is appended to a FIFO queue and started when a running task settles.
//!
//! Admission is decided when [`Controller::execute`] is **called**, not when the returned
//! future is first polled, so the queue order is the call order.
//! The controller never transforms a task's output: the returned future resolves to
//! exactly what the task produced.
//!
//! Dropping a returned future is always safe:
//! - a queued task leaves the queue;
//! - a running task gives its slot back and the next queued task starts.
//!
//! A future from `execute` holds its slot from the call onwards but only runs while
//! polled, so every returned future must be driven (e.g. with `join_all`). When the
//! caller may await in any order, or not at all, use [`Controller::spawn`]: the task
//! runs on the tokio runtime and the returned [`TaskHandle`] settles on its own.
mod admission;
mod handle;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use pacer_model::ControllerConfig;
use tracing::debug;

use crate::error::ControllerError;
use crate::event::{Bus, Subscribe};
use admission::{Shared, Ticket};
pub use handle::TaskHandle;

/// Handle to a shared concurrency budget.
///
/// Cloning is cheap; every clone admits against the same `running`/`queue` state.
#[derive(Clone)]
pub struct Controller {
    shared: Arc<Shared>,
}

impl Controller {
    /// Create a controller with the given ceiling (clamped to at least 1).
    pub fn new(limit: usize) -> Self {
        Self::builder(ControllerConfig::new(limit)).build()
    }

    pub fn builder(config: ControllerConfig) -> ControllerBuilder {
        ControllerBuilder {
            config,
            subscribers: Vec::new(),
        }
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.shared.limit
    }

    #[inline]
    pub fn queue_capacity(&self) -> Option<usize> {
        self.shared.queue_capacity
    }

    /// Number of tasks currently holding a slot.
    pub fn running_count(&self) -> usize {
        self.shared.running()
    }

    /// Number of tasks waiting for a slot.
    pub fn queue_count(&self) -> usize {
        self.shared.queued()
    }

    /// Submit `task` under the concurrency ceiling.
    ///
    /// Never rejects on its own: the queue is unbounded here even when a
    /// `queue_capacity` was configured (see [`Controller::try_execute`]).
    ///
    /// An admitted task holds its slot until the returned future settles or is dropped,
    /// and it only makes progress while polled. Leaving such a future unpolled while
    /// awaiting a later submission stalls the queue; see [`Controller::spawn`].
    pub fn execute<F, Fut, T, E>(
        &self,
        task: F,
    ) -> impl Future<Output = Result<T, E>> + use<F, Fut, T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let ticket = self.shared.admit();
        run(ticket, task)
    }

    /// Like [`Controller::execute`], but refuses the task when it would have to wait
    /// in a queue that already holds `queue_capacity` entries.
    pub fn try_execute<F, Fut, T, E>(
        &self,
        task: F,
    ) -> Result<impl Future<Output = Result<T, E>> + use<F, Fut, T, E>, ControllerError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let ticket = match self.shared.queue_capacity {
            Some(capacity) => self.shared.try_admit(capacity)?,
            None => self.shared.admit(),
        };
        Ok(run(ticket, task))
    }

    /// Submit `task` and drive it on the tokio runtime.
    ///
    /// Admission is decided at call time exactly as in [`Controller::execute`]; the
    /// task then starts (or waits its turn) without the caller polling anything.
    pub fn spawn<F, Fut, T, E>(&self, task: F) -> TaskHandle<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        TaskHandle::new(tokio::spawn(self.execute(task)))
    }

    /// [`Controller::spawn`] honouring the configured `queue_capacity`.
    pub fn try_spawn<F, Fut, T, E>(&self, task: F) -> Result<TaskHandle<T, E>, ControllerError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let fut = self.try_execute(task)?;
        Ok(TaskHandle::new(tokio::spawn(fut)))
    }
}

async fn run<F, Fut, T, E>(ticket: Ticket, task: F) -> Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut slot = ticket.acquire().await;
    let res = task().await;
    slot.settle(res.is_ok());
    res
}

impl Default for Controller {
    fn default() -> Self {
        Self::builder(ControllerConfig::default()).build()
    }
}

impl From<ControllerConfig> for Controller {
    fn from(config: ControllerConfig) -> Self {
        Self::builder(config).build()
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("limit", &self.shared.limit)
            .field("queue_capacity", &self.shared.queue_capacity)
            .field("running", &self.running_count())
            .field("queued", &self.queue_count())
            .field("subscribers", &self.shared.bus.len())
            .finish()
    }
}

pub struct ControllerBuilder {
    config: ControllerConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ControllerBuilder {
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers.extend(subscribers);
        self
    }

    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    pub fn build(self) -> Controller {
        let limit = self.config.effective_limit();
        debug!(
            limit,
            queue_capacity = ?self.config.queue_capacity,
            subscribers = self.subscribers.len(),
            "controller created"
        );
        let shared = Shared::new(limit, self.config.queue_capacity, Bus::new(self.subscribers));
        Controller {
            shared: Arc::new(shared),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use futures::future::join_all;
    use tokio::sync::oneshot;
    use tokio::time::{Instant, sleep};

    use super::*;
    use crate::event::testing::Recorder;
    use crate::event::EventKind;

    /// Let every spawned task run until it blocks.
    async fn settle() {
        sleep(Duration::from_millis(1)).await;
    }

    /// Paused-clock timers may round up to the next millisecond tick.
    fn assert_near(actual: Duration, expected_ms: u64) {
        let expected = Duration::from_millis(expected_ms);
        assert!(
            actual >= expected && actual <= expected + Duration::from_millis(2),
            "expected ~{expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn zero_limit_is_clamped_to_one() {
        assert_eq!(Controller::new(0).limit(), 1);
        assert_eq!(Controller::new(4).limit(), 4);
    }

    #[test]
    fn admission_happens_at_call_time() {
        let ctrl = Controller::new(2);
        let pending: Vec<_> = (0..4)
            .map(|i| ctrl.execute(move || async move { Ok::<_, ()>(i) }))
            .collect();

        assert_eq!(ctrl.running_count(), 2);
        assert_eq!(ctrl.queue_count(), 2);

        drop(pending);
        assert_eq!(ctrl.running_count(), 0);
        assert_eq!(ctrl.queue_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn queued_tasks_start_in_submission_order() {
        let ctrl = Controller::new(2);
        let started = Arc::new(Mutex::new(Vec::new()));
        let mut signals = Vec::new();
        let mut handles = Vec::new();

        for i in 0..5usize {
            let (tx, rx) = oneshot::channel::<()>();
            signals.push(Some(tx));
            let started = Arc::clone(&started);
            handles.push(tokio::spawn(ctrl.execute(move || async move {
                started.lock().unwrap().push(i);
                let _ = rx.await;
                Ok::<_, ()>(i)
            })));
        }

        settle().await;
        assert_eq!(*started.lock().unwrap(), vec![0, 1]);
        assert_eq!(ctrl.running_count(), 2);
        assert_eq!(ctrl.queue_count(), 3);

        // Releasing out of order still admits the queue head.
        signals[1].take().unwrap().send(()).unwrap();
        settle().await;
        assert_eq!(*started.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(ctrl.running_count(), 2);
        assert_eq!(ctrl.queue_count(), 2);

        signals[0].take().unwrap().send(()).unwrap();
        settle().await;
        assert_eq!(*started.lock().unwrap(), vec![0, 1, 2, 3]);
        assert!(ctrl.running_count() <= ctrl.limit());

        for tx in signals.iter_mut().filter_map(Option::take) {
            let _ = tx.send(());
        }
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), Ok(i));
        }
        assert_eq!(*started.lock().unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(ctrl.running_count(), 0);
        assert_eq!(ctrl.queue_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn two_slots_four_tasks_finish_in_two_rounds() {
        let ctrl = Controller::new(2);
        let origin = Instant::now();
        let starts = Arc::new(Mutex::new(vec![Duration::ZERO; 4]));

        let pending: Vec<_> = (0..4usize)
            .map(|i| {
                let starts = Arc::clone(&starts);
                ctrl.execute(move || async move {
                    starts.lock().unwrap()[i] = origin.elapsed();
                    sleep(Duration::from_millis(50)).await;
                    Ok::<_, ()>(i)
                })
            })
            .collect();
        let out = join_all(pending).await;

        assert_eq!(out, vec![Ok(0), Ok(1), Ok(2), Ok(3)]);
        let starts = starts.lock().unwrap().clone();
        assert_near(starts[0], 0);
        assert_near(starts[1], 0);
        assert_near(starts[2], 50);
        assert_near(starts[3], 50);
        assert_near(origin.elapsed(), 100);
    }

    #[tokio::test]
    async fn failures_are_returned_verbatim_and_isolated() {
        let ctrl = Controller::new(1);
        let failing = ctrl.execute(|| async { Err::<u32, _>("boom") });
        let ok = ctrl.execute(|| async { Ok::<u32, &str>(7) });

        let (failing, ok) = tokio::join!(failing, ok);
        assert_eq!(failing, Err("boom"));
        assert_eq!(ok, Ok(7));
        assert_eq!(ctrl.running_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_task_still_frees_its_slot() {
        let ctrl = Controller::new(1);
        let panicking = tokio::spawn(ctrl.execute(|| async {
            sleep(Duration::from_millis(5)).await;
            if true {
                panic!("task blew up");
            }
            Ok::<u32, ()>(0)
        }));
        let next = ctrl.execute(|| async { Ok::<u32, ()>(1) });
        assert_eq!(ctrl.queue_count(), 1);

        assert!(panicking.await.unwrap_err().is_panic());
        assert_eq!(next.await, Ok(1));
        assert_eq!(ctrl.running_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_queued_future_leaves_the_queue() {
        let recorder = Arc::new(Recorder::default());
        let ctrl = Controller::builder(ControllerConfig::new(1))
            .with_subscriber(recorder.clone())
            .build();

        let (tx, rx) = oneshot::channel::<()>();
        let first = tokio::spawn(ctrl.execute(move || async move {
            let _ = rx.await;
            Ok::<_, ()>(())
        }));
        let second = ctrl.execute(|| async { Ok::<_, ()>(()) });
        assert_eq!(ctrl.queue_count(), 1);

        drop(second);
        assert_eq!(ctrl.queue_count(), 0);
        assert_eq!(ctrl.running_count(), 1);

        tx.send(()).unwrap();
        first.await.unwrap().unwrap();
        assert_eq!(ctrl.running_count(), 0);
        assert!(recorder.kinds().contains(&(EventKind::TaskAbandoned, 1)));
    }

    #[tokio::test]
    async fn try_execute_rejects_when_queue_is_full() {
        let ctrl = Controller::from(ControllerConfig::new(1).with_queue_capacity(1));

        let first = ctrl.try_execute(|| async { Ok::<_, ()>(1) }).unwrap();
        let second = ctrl.try_execute(|| async { Ok::<_, ()>(2) }).unwrap();
        assert_eq!(ctrl.running_count(), 1);
        assert_eq!(ctrl.queue_count(), 1);

        let third = ctrl.try_execute(|| async { Ok::<_, ()>(3) });
        assert_eq!(
            third.err(),
            Some(ControllerError::QueueFull { capacity: 1 })
        );
        assert_eq!(ctrl.queue_count(), 1);

        // The plain path keeps the unbounded behaviour.
        let fourth = ctrl.execute(|| async { Ok::<_, ()>(4) });
        assert_eq!(ctrl.queue_count(), 2);

        let out = tokio::join!(first, second, fourth);
        assert_eq!(out, (Ok(1), Ok(2), Ok(4)));
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_handles_settle_in_any_await_order() {
        let ctrl = Controller::new(1);
        let first = ctrl.spawn(|| async {
            sleep(Duration::from_millis(10)).await;
            Ok::<_, ()>("first")
        });
        let second = ctrl.spawn(|| async { Ok::<_, ()>("second") });
        assert_eq!(ctrl.running_count(), 1);
        assert_eq!(ctrl.queue_count(), 1);

        let second = tokio::time::timeout(Duration::from_secs(5), second).await;
        assert_eq!(second, Ok(Ok("second")));
        assert!(first.is_finished());
        assert_eq!(first.await, Ok("first"));
        assert_eq!(ctrl.running_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_task_runs_without_being_awaited() {
        let ctrl = Controller::new(1);
        let started = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&started);

        let handle = ctrl.spawn(move || async move {
            *flag.lock().unwrap() = true;
            Ok::<_, ()>(())
        });
        drop(handle);

        settle().await;
        assert!(*started.lock().unwrap());
        assert_eq!(ctrl.running_count(), 0);
    }

    #[tokio::test]
    async fn try_spawn_honours_queue_capacity() {
        let ctrl = Controller::from(ControllerConfig::new(1).with_queue_capacity(0));
        let (tx, rx) = oneshot::channel::<()>();

        let held = ctrl
            .try_spawn(move || async move {
                let _ = rx.await;
                Ok::<_, ()>(1)
            })
            .unwrap();
        let refused = ctrl.try_spawn(|| async { Ok::<_, ()>(2) });
        assert_eq!(
            refused.err(),
            Some(ControllerError::QueueFull { capacity: 0 })
        );

        tx.send(()).unwrap();
        assert_eq!(held.await, Ok(1));
    }

    #[tokio::test]
    async fn lifecycle_events_follow_bookkeeping() {
        let recorder = Arc::new(Recorder::default());
        let ctrl = Controller::builder(ControllerConfig::new(1))
            .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
            .build();

        let a = ctrl.execute(|| async { Ok::<_, &str>(()) });
        let b = ctrl.execute(|| async { Err::<(), _>("nope") });
        let _ = tokio::join!(a, b);

        assert_eq!(
            recorder.kinds(),
            vec![
                (EventKind::TaskStarting, 0),
                (EventKind::TaskQueued, 1),
                (EventKind::TaskStopped, 0),
                (EventKind::TaskStarting, 1),
                (EventKind::TaskFailed, 1),
            ]
        );
        assert!(recorder.events().iter().all(|e| e.running <= e.limit));
    }
}
