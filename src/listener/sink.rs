use super::backpressure::{OverflowPolicy, PushOutcome};
use super::metrics::QueueStats;
use super::queue::RequestQueue;
use super::traits::TraceListener;
use super::worker::{WorkerExit, process_queue};
use crate::domain::{LogEntry, LogLevel, LogPayload, LogSenderDetails, SinkError};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub const DEFAULT_QUEUE_CAPACITY: usize = 100_000;
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);
// Fits inside a container stop grace period with room for the rest of the process.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(4);

/// Runtime settings of one sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    pub capacity: usize,
    pub overflow: OverflowPolicy,
    pub flush_timeout: Duration,
    pub shutdown_timeout: Duration,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_QUEUE_CAPACITY,
            overflow: OverflowPolicy::default(),
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

struct Shared<L> {
    queue: RequestQueue,
    listener: L,
}

/// A log sink whose `write` only enqueues. A background task owned by the
/// sink hands each entry, in order, to the listener's `trace_async`.
///
/// Stop it with [`shutdown`](Self::shutdown) to drain the backlog first, or
/// [`cancel`](Self::cancel) to stop at once and abandon whatever is queued.
/// Dropping the sink requests a graceful shutdown without waiting for it.
pub struct AsyncTraceSink<L: TraceListener + 'static> {
    shared: Arc<Shared<L>>,
    config: ListenerConfig,
    shutdown: CancellationToken,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<WorkerExit>>>,
}

impl<L: TraceListener + 'static> AsyncTraceSink<L> {
    /// Creates the sink and starts its worker on the current tokio runtime.
    pub fn spawn(listener: L, config: ListenerConfig) -> Result<Self, SinkError> {
        let runtime = Handle::try_current().map_err(|_| SinkError::NoRuntime)?;
        let queue = RequestQueue::new(config.capacity, config.overflow)?;
        let shared = Arc::new(Shared { queue, listener });
        let shutdown = CancellationToken::new();
        let cancel = CancellationToken::new();

        let worker = {
            let shared = shared.clone();
            let shutdown = shutdown.clone();
            let cancel = cancel.clone();
            runtime.spawn(async move {
                process_queue(&shared.queue, &shared.listener, shutdown, cancel).await
            })
        };

        debug!(
            listener = shared.listener.name(),
            capacity = config.capacity,
            overflow = %config.overflow,
            "Async trace sink started"
        );

        Ok(Self {
            shared,
            config,
            shutdown,
            cancel,
            worker: Mutex::new(Some(worker)),
        })
    }

    pub fn spawn_default(listener: L) -> Result<Self, SinkError> {
        Self::spawn(listener, ListenerConfig::default())
    }

    pub fn name(&self) -> &str {
        self.shared.listener.name()
    }

    pub fn listener(&self) -> &L {
        &self.shared.listener
    }

    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    /// Every level but `None` is accepted; filtering belongs to the caller.
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::None
    }

    /// Queues one entry and returns without waiting for it to be traced.
    ///
    /// Fails with `SinkError::Closed` once the worker has stopped, and with
    /// `SinkError::QueueFull` when the queue is full under
    /// `OverflowPolicy::Reject`. Entries at `LogLevel::None` are ignored.
    pub fn write(
        &self,
        level: LogLevel,
        payload: LogPayload,
        sender: Option<LogSenderDetails>,
    ) -> Result<(), SinkError> {
        if !self.is_enabled(level) {
            return Ok(());
        }
        self.enqueue(LogEntry::new(level, payload, sender))?;
        Ok(())
    }

    pub fn write_message(
        &self,
        level: LogLevel,
        message: impl Into<String>,
    ) -> Result<(), SinkError> {
        self.write(level, LogPayload::Message(message.into()), None)
    }

    pub fn write_data<T: Serialize + ?Sized>(
        &self,
        level: LogLevel,
        data: &T,
        sender: Option<LogSenderDetails>,
    ) -> Result<(), SinkError> {
        self.write(level, LogPayload::data(data)?, sender)
    }

    /// Queues a prepared entry and reports what the queue did with it.
    pub fn enqueue(&self, entry: LogEntry) -> Result<PushOutcome, SinkError> {
        self.shared.queue.push(entry)
    }

    /// Waits until every entry written so far has been traced, up to the
    /// configured flush timeout.
    pub async fn flush(&self) -> Result<(), SinkError> {
        self.flush_timeout(self.config.flush_timeout).await
    }

    pub async fn flush_timeout(&self, limit: Duration) -> Result<(), SinkError> {
        tokio::time::timeout(limit, self.shared.queue.wait_idle())
            .await
            .map_err(|_| {
                warn!(
                    listener = self.name(),
                    pending = self.shared.queue.len(),
                    "Flush timed out"
                );
                SinkError::FlushTimeout(limit)
            })
    }

    /// Stops accepting writes once the backlog is drained and waits for the
    /// worker to finish.
    ///
    /// If draining takes longer than the shutdown timeout the worker is
    /// cancelled, the rest of the backlog abandoned, and
    /// `SinkError::ShutdownTimeout` returned. Calling it again after it has
    /// completed is a no-op.
    pub async fn shutdown(&self) -> Result<(), SinkError> {
        let mut worker = self.worker.lock().await;
        let Some(handle) = worker.as_mut() else {
            return Ok(());
        };

        info!(
            listener = self.name(),
            pending = self.shared.queue.len(),
            "Initiating graceful shutdown of trace sink"
        );
        self.shutdown.cancel();

        let limit = self.config.shutdown_timeout;
        let joined = tokio::time::timeout(limit, handle).await;
        match joined {
            Ok(joined) => {
                worker.take();
                self.report_exit(joined);
                info!(listener = self.name(), "Trace sink shut down");
                Ok(())
            }
            Err(_) => {
                error!(
                    listener = self.name(),
                    timeout = ?limit,
                    pending = self.shared.queue.len(),
                    "Shutdown timeout exceeded, cancelling trace worker"
                );
                self.cancel.cancel();
                if let Some(handle) = worker.take() {
                    self.report_exit(handle.await);
                }
                Err(SinkError::ShutdownTimeout(limit))
            }
        }
    }

    /// Stops the worker immediately. Queued entries are abandoned and the
    /// entry being traced, if any, is interrupted.
    pub async fn cancel(&self) {
        self.cancel.cancel();
        let mut worker = self.worker.lock().await;
        if let Some(handle) = worker.take() {
            self.report_exit(handle.await);
        }
    }

    /// True until the worker has stopped and the sink refuses writes.
    pub fn is_running(&self) -> bool {
        !self.shared.queue.is_closed()
    }

    pub fn stats(&self) -> QueueStats {
        self.shared.queue.stats()
    }

    /// Token that requests the graceful shutdown.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Token that requests hard cancellation.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn report_exit(&self, joined: Result<WorkerExit, JoinError>) {
        match joined {
            Ok(exit) => debug!(listener = self.name(), ?exit, "Trace worker joined"),
            Err(e) => error!(listener = self.name(), error = %e, "Trace worker task failed"),
        }
    }
}

impl<L: TraceListener + 'static> Drop for AsyncTraceSink<L> {
    fn drop(&mut self) {
        if self.worker.get_mut().is_some() {
            debug!(
                listener = self.name(),
                pending = self.shared.queue.len(),
                "Trace sink dropped without shutdown, worker left to drain unjoined"
            );
        }
        self.shutdown.cancel();
    }
}

impl<L: TraceListener + 'static> std::fmt::Debug for AsyncTraceSink<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncTraceSink")
            .field("name", &self.name())
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish()
    }
}
