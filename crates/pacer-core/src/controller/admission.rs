use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::trace;

use crate::error::ControllerError;
use crate::event::{Bus, Event, EventKind};

/// State shared by every clone of a controller.
///
/// All mutation happens under `state` and never across an `.await`,
/// so the check `running < limit` and the increment are one step.
pub(crate) struct Shared {
    pub(crate) limit: usize,
    pub(crate) queue_capacity: Option<usize>,
    state: Mutex<State>,
    pub(crate) bus: Bus,
}

#[derive(Default)]
struct State {
    running: usize,
    queue: VecDeque<Waiter>,
    next_seq: u64,
}

struct Waiter {
    seq: u64,
    wake: oneshot::Sender<()>,
}

impl Shared {
    pub(crate) fn new(limit: usize, queue_capacity: Option<usize>, bus: Bus) -> Self {
        Self {
            limit: limit.max(1),
            queue_capacity,
            state: Mutex::new(State::default()),
            bus,
        }
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    fn event(&self, kind: EventKind, seq: u64, st: &State) -> Event {
        Event {
            kind,
            seq,
            running: st.running,
            queued: st.queue.len(),
            limit: self.limit,
        }
    }

    pub(crate) fn running(&self) -> usize {
        self.lock().running
    }

    pub(crate) fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    /// Admit unconditionally: take a free slot or join the tail of the queue.
    pub(crate) fn admit(self: &Arc<Self>) -> Ticket {
        let st = self.lock();
        self.admit_locked(st)
    }

    /// Admit unless the task would have to wait in a queue already holding `capacity` entries.
    pub(crate) fn try_admit(self: &Arc<Self>, capacity: usize) -> Result<Ticket, ControllerError> {
        let mut st = self.lock();
        if st.running >= self.limit && st.queue.len() >= capacity {
            let seq = st.next_seq;
            st.next_seq += 1;
            let event = self.event(EventKind::QueueRejected, seq, &st);
            drop(st);

            trace!(seq, capacity, "queue full; task rejected");
            self.bus.publish(&event);
            return Err(ControllerError::QueueFull { capacity });
        }
        Ok(self.admit_locked(st))
    }

    fn admit_locked(self: &Arc<Self>, mut st: MutexGuard<'_, State>) -> Ticket {
        let seq = st.next_seq;
        st.next_seq += 1;

        if st.running < self.limit {
            st.running += 1;
            let event = self.event(EventKind::TaskStarting, seq, &st);
            drop(st);

            trace!(seq, "slot free; task admitted");
            self.bus.publish(&event);
            return Ticket::Ready(Slot::new(Arc::clone(self), seq));
        }

        let (wake, rx) = oneshot::channel();
        st.queue.push_back(Waiter { seq, wake });
        let event = self.event(EventKind::TaskQueued, seq, &st);
        drop(st);

        trace!(seq, queued = event.queued, "limit reached; task queued");
        self.bus.publish(&event);
        Ticket::Queued(Waiting {
            shared: Arc::clone(self),
            seq,
            rx,
            granted: false,
        })
    }

    /// Free one slot and hand freed capacity to the head of the queue.
    fn release(&self, seq: u64, kind: EventKind) {
        let mut events = Vec::with_capacity(2);
        {
            let mut st = self.lock();
            st.running = st.running.saturating_sub(1);
            events.push(self.event(kind, seq, &st));

            while st.running < self.limit {
                let Some(waiter) = st.queue.pop_front() else {
                    break;
                };
                if waiter.wake.send(()).is_ok() {
                    st.running += 1;
                    events.push(self.event(EventKind::TaskStarting, waiter.seq, &st));
                }
            }
        }
        for event in &events {
            self.bus.publish(event);
        }
    }

    /// Called when a queued task's future is dropped.
    fn abandon(&self, seq: u64) {
        let mut st = self.lock();
        match st.queue.iter().position(|w| w.seq == seq) {
            Some(pos) => {
                st.queue.remove(pos);
                let event = self.event(EventKind::TaskAbandoned, seq, &st);
                drop(st);

                trace!(seq, "queued task dropped before start");
                self.bus.publish(&event);
            }
            None => {
                // Granted but never observed: give the slot back.
                drop(st);
                self.release(seq, EventKind::TaskAbandoned);
            }
        }
    }
}

/// Outcome of an admission decision.
pub(crate) enum Ticket {
    Ready(Slot),
    Queued(Waiting),
}

impl Ticket {
    pub(crate) async fn acquire(self) -> Slot {
        match self {
            Ticket::Ready(slot) => slot,
            Ticket::Queued(waiting) => waiting.granted().await,
        }
    }
}

pub(crate) struct Waiting {
    shared: Arc<Shared>,
    seq: u64,
    rx: oneshot::Receiver<()>,
    granted: bool,
}

impl Waiting {
    async fn granted(mut self) -> Slot {
        // The sender is consumed only by a grant in `release`.
        let _ = (&mut self.rx).await;
        self.granted = true;
        Slot::new(Arc::clone(&self.shared), self.seq)
    }
}

impl Drop for Waiting {
    fn drop(&mut self) {
        if !self.granted {
            self.shared.abandon(self.seq);
        }
    }
}

/// One unit of capacity. Returned to the controller on drop, whatever the outcome.
pub(crate) struct Slot {
    shared: Arc<Shared>,
    seq: u64,
    outcome: Option<EventKind>,
}

impl Slot {
    fn new(shared: Arc<Shared>, seq: u64) -> Self {
        Self {
            shared,
            seq,
            outcome: None,
        }
    }

    pub(crate) fn settle(&mut self, ok: bool) {
        self.outcome = Some(if ok {
            EventKind::TaskStopped
        } else {
            EventKind::TaskFailed
        });
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        let kind = self.outcome.unwrap_or(EventKind::TaskAbandoned);
        self.shared.release(self.seq, kind);
    }
}
