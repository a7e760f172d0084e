use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Point-in-time view of a request queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub capacity: usize,
    pub depth: usize,
    pub in_flight: usize,
    pub peak_depth: usize,
    pub enqueued: u64,
    pub processed: u64,
    pub failed: u64,
    pub dropped: u64,
    pub abandoned: u64,
}

impl QueueStats {
    /// Entries the worker has finished with, successfully or not.
    pub fn completed(&self) -> u64 {
        self.processed + self.failed
    }

    pub fn fill_ratio(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.depth as f64 / self.capacity as f64
    }
}

/// How the worker finished with an entry it popped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Processed,
    Failed,
    Abandoned,
}

#[derive(Debug, Default)]
pub(crate) struct QueueMetricsCollector {
    enqueued: AtomicU64,
    processed: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
    abandoned: AtomicU64,
    peak_depth: AtomicUsize,
}

impl QueueMetricsCollector {
    pub(crate) fn record_enqueued(&self, depth: usize) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
        self.peak_depth.fetch_max(depth, Ordering::Relaxed);
    }

    /// Returns the total number of drops including this one.
    pub(crate) fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn record_abandoned(&self, count: usize) {
        self.abandoned.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_completion(&self, completion: Completion) {
        let counter = match completion {
            Completion::Processed => &self.processed,
            Completion::Failed => &self.failed,
            Completion::Abandoned => &self.abandoned,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, capacity: usize, depth: usize, in_flight: usize) -> QueueStats {
        QueueStats {
            capacity,
            depth,
            in_flight,
            peak_depth: self.peak_depth.load(Ordering::Relaxed),
            enqueued: self.enqueued.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
        }
    }
}
