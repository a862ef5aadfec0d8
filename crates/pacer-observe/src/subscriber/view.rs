use pacer_core::{Event, EventKind};
use tracing::{debug, trace, warn};

#[inline]
pub fn message_for(kind: EventKind) -> &'static str {
    match kind {
        // admission
        EventKind::TaskQueued => "limit reached; task waiting for a slot",
        EventKind::QueueRejected => "queue at capacity; task refused",

        // lifecycle
        EventKind::TaskStarting => "task is starting",
        EventKind::TaskStopped => "task settled with a value",
        EventKind::TaskFailed => "task settled with a failure",
        EventKind::TaskAbandoned => "task dropped by its caller before settling",
    }
}

/// Emit one `tracing` record for a controller event, at a level matching its weight.
#[inline]
pub fn log_event(e: &Event) {
    let msg = message_for(e.kind);
    let (seq, running, queued, limit) = (e.seq, e.running, e.queued, e.limit);

    match e.kind {
        EventKind::TaskStarting | EventKind::TaskStopped => {
            trace!(seq, running, queued, limit, "{msg}")
        }
        EventKind::TaskQueued => debug!(seq, running, queued, limit, "{msg}"),
        EventKind::TaskFailed => debug!(seq, running, queued, "{msg}"),
        EventKind::TaskAbandoned => debug!(seq, running, queued, "{msg}"),
        EventKind::QueueRejected => warn!(seq, queued, limit, "{msg}"),
    }
}
