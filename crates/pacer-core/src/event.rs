//! Controller lifecycle events.
//!
//! A [`Controller`](crate::Controller) publishes one [`Event`] per bookkeeping step
//! (admission, start, settle, drop) to every registered [`Subscribe`] implementation.
//! Delivery is synchronous and happens after the controller lock is released,
//! so subscribers may read `running_count`/`queue_count` from inside `on_event`.
use std::sync::Arc;

/// What happened to a task inside the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Capacity exhausted; task appended to the tail of the queue.
    TaskQueued,
    /// Task took a slot and is about to be invoked.
    TaskStarting,
    /// Task settled with a value.
    TaskStopped,
    /// Task settled with a failure.
    TaskFailed,
    /// Caller dropped the task's future before it settled.
    TaskAbandoned,
    /// `try_execute` refused the task because the queue is at capacity.
    QueueRejected,
}

/// Snapshot attached to every published event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    /// Submission number, 0-based in `execute` call order.
    pub seq: u64,
    /// Tasks holding a slot after this step.
    pub running: usize,
    /// Tasks waiting in the queue after this step.
    pub queued: usize,
    pub limit: usize,
}

/// Observer of controller events.
pub trait Subscribe: Send + Sync {
    fn on_event(&self, event: &Event);

    fn name(&self) -> &'static str {
        "subscriber"
    }
}

#[derive(Clone, Default)]
pub(crate) struct Bus {
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl Bus {
    pub(crate) fn new(subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        Self { subscribers }
    }

    #[inline]
    pub(crate) fn publish(&self, event: &Event) {
        for sub in &self.subscribers {
            sub.on_event(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Subscriber that keeps every event it sees.
    #[derive(Default)]
    pub struct Recorder {
        events: Mutex<Vec<Event>>,
    }

    impl Recorder {
        pub fn kinds(&self) -> Vec<(EventKind, u64)> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .map(|e| (e.kind, e.seq))
                .collect()
        }

        pub fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }
    }

    impl Subscribe for Recorder {
        fn on_event(&self, event: &Event) {
            self.events.lock().unwrap().push(event.clone());
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }
}
