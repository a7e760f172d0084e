use async_trace_sink::listener::base;
use async_trace_sink::{
    AsyncTraceSink, LogEntry, LogLevel, SinkError, TraceEventData, TraceListener,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Waits a fixed delay per entry instead of tracing it.
struct DelayListener {
    delay: Duration,
    processed: Mutex<Vec<u64>>,
    trace_called: AtomicBool,
}

impl DelayListener {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            processed: Mutex::new(Vec::new()),
            trace_called: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl TraceListener for DelayListener {
    fn trace_message(&self, event: &TraceEventData, message: &str) {
        self.trace_called.store(true, Ordering::SeqCst);
        base::trace_message(event, message);
    }

    fn trace_data(&self, event: &TraceEventData, data: &serde_json::Value) {
        self.trace_called.store(true, Ordering::SeqCst);
        base::trace_data(event, data);
    }

    async fn trace_async(
        &self,
        entry: &LogEntry,
        cancel: &CancellationToken,
    ) -> Result<(), SinkError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(SinkError::Cancelled),
            _ = tokio::time::sleep(self.delay) => {
                self.processed.lock().push(entry.sequence());
                Ok(())
            }
        }
    }
}

/// Records the level and payload handed to each synchronous hook.
#[derive(Default)]
struct LevelRecorder {
    calls: Mutex<Vec<(LogLevel, String)>>,
}

impl TraceListener for LevelRecorder {
    fn trace_message(&self, event: &TraceEventData, message: &str) {
        self.calls.lock().push((event.level, message.to_string()));
        base::trace_message(event, message);
    }

    fn trace_data(&self, event: &TraceEventData, data: &serde_json::Value) {
        self.calls.lock().push((event.level, data.to_string()));
        base::trace_data(event, data);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cooperative_shutdown_waits_for_slow_backlog() {
    let sink = AsyncTraceSink::spawn_default(DelayListener::new(Duration::from_millis(50))).unwrap();
    let started = Instant::now();
    for _ in 0..3 {
        sink.write_message(LogLevel::Information, "delayed").unwrap();
    }

    sink.shutdown().await.unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(150), "drained too early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(1_000), "drain took {elapsed:?}");
    assert_eq!(*sink.listener().processed.lock(), vec![1, 2, 3]);
    // overriding trace_async bypasses the synchronous hooks
    assert!(!sink.listener().trace_called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_levels_reach_hooks_once_each_in_order() {
    let sink = AsyncTraceSink::spawn_default(LevelRecorder::default()).unwrap();

    sink.write_message(LogLevel::Information, "first").unwrap();
    sink.write_data(LogLevel::Debug, &json!({"second": 2}), None)
        .unwrap();
    sink.write_message(LogLevel::Error, "third").unwrap();
    sink.shutdown().await.unwrap();

    let calls = sink.listener().calls.lock().clone();
    assert_eq!(
        calls,
        vec![
            (LogLevel::Information, "first".to_string()),
            (LogLevel::Debug, json!({"second": 2}).to_string()),
            (LogLevel::Error, "third".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_sender_details_reach_the_event() {
    #[derive(Default)]
    struct SenderRecorder {
        events: Mutex<Vec<TraceEventData>>,
    }

    impl TraceListener for SenderRecorder {
        fn trace_message(&self, event: &TraceEventData, message: &str) {
            self.events.lock().push(event.clone());
            base::trace_message(event, message);
        }
    }

    let customer = uuid::Uuid::new_v4();
    let sink = AsyncTraceSink::spawn_default(SenderRecorder::default()).unwrap();
    sink.write(
        LogLevel::Warning,
        "for customer".into(),
        Some(async_trace_sink::LogSenderDetails::new(
            Some(customer),
            Some(uuid::Uuid::nil()),
        )),
    )
    .unwrap();
    sink.shutdown().await.unwrap();

    let events = sink.listener().events.lock().clone();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].customer_id, Some(customer));
    assert_eq!(events[0].session_id, None);
    assert_eq!(events[0].source, async_trace_sink::listener::DEFAULT_LISTENER_NAME);
}
