use super::backpressure::{OverflowPolicy, PushOutcome};
use super::metrics::{Completion, QueueMetricsCollector, QueueStats};
use crate::domain::{LogEntry, SinkError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::Notify;
use tokio::sync::futures::Notified;
use tracing::warn;

/// Upper bound on the configurable capacity, to keep a misconfigured sink
/// from reserving absurd amounts of memory.
pub const MAX_QUEUE_CAPACITY: usize = 100_000_000;

const DROP_WARN_INTERVAL: u64 = 1_000;

#[derive(Debug)]
struct QueueState {
    entries: VecDeque<LogEntry>,
    in_flight: usize,
    next_sequence: u64,
    closed: bool,
}

/// FIFO of log entries awaiting the background worker.
///
/// Any number of producers may push concurrently; exactly one consumer pops.
/// The lock is only held for the push/pop itself. An entry counts as pending
/// from `push` until the consumer calls `complete` for it, which is what
/// `wait_idle` waits on.
#[derive(Debug)]
pub struct RequestQueue {
    state: Mutex<QueueState>,
    capacity: usize,
    overflow: OverflowPolicy,
    item_ready: Notify,
    idle: Notify,
    metrics: QueueMetricsCollector,
}

impl RequestQueue {
    pub fn new(capacity: usize, overflow: OverflowPolicy) -> Result<Self, SinkError> {
        if capacity == 0 || capacity > MAX_QUEUE_CAPACITY {
            return Err(SinkError::InvalidCapacity { capacity });
        }

        Ok(Self {
            state: Mutex::new(QueueState {
                entries: VecDeque::new(),
                in_flight: 0,
                next_sequence: 1,
                closed: false,
            }),
            capacity,
            overflow,
            item_ready: Notify::new(),
            idle: Notify::new(),
            metrics: QueueMetricsCollector::default(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// True when nothing is queued and nothing is being processed.
    pub fn is_idle(&self) -> bool {
        let state = self.state.lock();
        state.entries.is_empty() && state.in_flight == 0
    }

    pub fn push(&self, entry: LogEntry) -> Result<PushOutcome, SinkError> {
        let outcome = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(SinkError::Closed);
            }

            let mut displaced = false;
            if state.entries.len() >= self.capacity {
                match self.overflow {
                    OverflowPolicy::DropNewest => {
                        drop(state);
                        self.note_drop();
                        return Ok(PushOutcome::Dropped);
                    }
                    OverflowPolicy::DropOldest => {
                        state.entries.pop_front();
                        displaced = true;
                    }
                    OverflowPolicy::Reject => {
                        return Err(SinkError::QueueFull {
                            capacity: self.capacity,
                        });
                    }
                }
            }

            let sequence = state.next_sequence;
            state.next_sequence += 1;
            state.entries.push_back(entry.with_sequence(sequence));
            self.metrics.record_enqueued(state.entries.len());
            PushOutcome::Enqueued {
                sequence,
                displaced,
            }
        };

        if let PushOutcome::Enqueued {
            displaced: true, ..
        } = outcome
        {
            self.note_drop();
        }
        self.item_ready.notify_one();
        Ok(outcome)
    }

    /// Takes the head of the queue and marks it in flight.
    pub fn pop(&self) -> Option<LogEntry> {
        let mut state = self.state.lock();
        let entry = state.entries.pop_front()?;
        state.in_flight += 1;
        Some(entry)
    }

    /// Records that the consumer is done with an entry returned by `pop`.
    pub fn complete(&self, completion: Completion) {
        self.metrics.record_completion(completion);
        let idle = {
            let mut state = self.state.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
            state.entries.is_empty() && state.in_flight == 0
        };
        if idle {
            self.idle.notify_waiters();
        }
    }

    /// Closes the queue if, and only if, it is empty. Checked under the same
    /// lock `push` takes, so a concurrent write is either seen here (and the
    /// caller keeps draining) or rejected with `SinkError::Closed`.
    pub fn close_if_empty(&self) -> bool {
        let closed = {
            let mut state = self.state.lock();
            if state.entries.is_empty() {
                state.closed = true;
            }
            state.closed
        };
        if closed {
            self.idle.notify_waiters();
        }
        closed
    }

    /// Closes the queue and discards everything still in it. Returns the
    /// number of entries discarded.
    pub fn close_and_abandon(&self) -> usize {
        let abandoned = {
            let mut state = self.state.lock();
            state.closed = true;
            let count = state.entries.len();
            state.entries.clear();
            count
        };
        self.metrics.record_abandoned(abandoned);
        self.idle.notify_waiters();
        abandoned
    }

    /// Resolves once an entry has been pushed since the last wakeup.
    pub fn item_ready(&self) -> Notified<'_> {
        self.item_ready.notified()
    }

    /// Waits until the queue is empty and no entry is in flight.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }

    pub fn stats(&self) -> QueueStats {
        let (depth, in_flight) = {
            let state = self.state.lock();
            (state.entries.len(), state.in_flight)
        };
        self.metrics.snapshot(self.capacity, depth, in_flight)
    }

    fn note_drop(&self) {
        let dropped = self.metrics.record_dropped();
        if dropped % DROP_WARN_INTERVAL == 1 {
            warn!(
                capacity = self.capacity,
                policy = %self.overflow,
                dropped_total = dropped,
                "Request queue full, dropping log entries"
            );
        }
    }
}
