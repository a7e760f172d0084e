use super::metrics::Completion;
use super::queue::RequestQueue;
use super::traits::TraceListener;
use crate::domain::SinkError;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Why the worker loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// Shutdown was requested and every queued entry was processed.
    Drained,
    /// Hard cancellation; whatever was still queued was abandoned.
    Cancelled,
}

/// Drains `queue` into `listener` until told to stop.
///
/// Entries are traced one at a time in FIFO order. The loop ends when
/// - `shutdown` is signalled and the queue is empty (it closes the queue so
///   later writes fail with `SinkError::Closed`), or
/// - `cancel` is signalled, immediately, even mid-backlog or mid-trace.
///
/// A failing or panicking trace is logged and the entry dropped; the loop
/// carries on with the next one.
pub async fn process_queue<L>(
    queue: &RequestQueue,
    listener: &L,
    shutdown: CancellationToken,
    cancel: CancellationToken,
) -> WorkerExit
where
    L: TraceListener + ?Sized,
{
    info!(listener = listener.name(), "Trace queue worker started");

    let exit = loop {
        if cancel.is_cancelled() {
            break WorkerExit::Cancelled;
        }

        if let Some(entry) = queue.pop() {
            let sequence = entry.sequence();
            let traced = AssertUnwindSafe(listener.trace_async(&entry, &cancel)).catch_unwind();
            // a trace that finished in the same poll as cancel still counts
            let outcome = tokio::select! {
                biased;
                result = traced => Some(result),
                _ = cancel.cancelled() => None,
            };

            match outcome {
                Some(Ok(Ok(()))) => queue.complete(Completion::Processed),
                Some(Ok(Err(SinkError::Cancelled))) if cancel.is_cancelled() => {
                    debug!(sequence, "Trace cancelled before delivery");
                    queue.complete(Completion::Abandoned);
                }
                Some(Ok(Err(e))) => {
                    warn!(
                        listener = listener.name(),
                        sequence,
                        error = %e,
                        "Trace operation failed, entry dropped"
                    );
                    queue.complete(Completion::Failed);
                }
                Some(Err(_panic)) => {
                    error!(
                        listener = listener.name(),
                        sequence, "Trace operation panicked, entry dropped"
                    );
                    queue.complete(Completion::Failed);
                }
                None => {
                    debug!(sequence, "Trace interrupted by cancellation");
                    queue.complete(Completion::Abandoned);
                    break WorkerExit::Cancelled;
                }
            }
            continue;
        }

        if shutdown.is_cancelled() {
            if queue.close_if_empty() {
                break WorkerExit::Drained;
            }
            // a write landed between pop and close; drain it first
            continue;
        }

        let item_ready = queue.item_ready();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break WorkerExit::Cancelled,
            _ = shutdown.cancelled() => {}
            _ = item_ready => {}
        }
    };

    if exit == WorkerExit::Cancelled {
        let abandoned = queue.close_and_abandon();
        if abandoned > 0 {
            info!(
                listener = listener.name(),
                abandoned, "Trace queue worker cancelled with entries still queued"
            );
        }
    }

    let stats = queue.stats();
    info!(
        listener = listener.name(),
        ?exit,
        processed = stats.processed,
        failed = stats.failed,
        dropped = stats.dropped,
        abandoned = stats.abandoned,
        "Trace queue worker stopped"
    );
    exit
}
