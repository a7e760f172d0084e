use async_trace_sink::listener::base;
use async_trace_sink::{
    AsyncTraceSink, ListenerConfig, LogEntry, LogLevel, SinkError, TraceEventData, TraceListener,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::{Instant, timeout};
use tokio_util::sync::CancellationToken;

/// Records the message of every entry it traces, in order.
#[derive(Default)]
struct Recording {
    messages: Mutex<Vec<String>>,
    per_entry: Duration,
    fail_marker: Option<&'static str>,
}

impl Recording {
    fn slow(per_entry: Duration) -> Self {
        Self {
            per_entry,
            ..Default::default()
        }
    }

    fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl TraceListener for Recording {
    fn name(&self) -> &str {
        "recording"
    }

    fn trace_message(&self, event: &TraceEventData, message: &str) {
        self.messages.lock().push(message.to_string());
        base::trace_message(event, message);
    }

    async fn trace_async(
        &self,
        entry: &LogEntry,
        cancel: &CancellationToken,
    ) -> Result<(), SinkError> {
        if !self.per_entry.is_zero() {
            tokio::time::sleep(self.per_entry).await;
        }
        if self.fail_marker.is_some() && entry.message() == self.fail_marker {
            return Err(SinkError::Trace("rejected by destination".to_string()));
        }
        base::trace_async(self, entry, cancel).await
    }
}

fn marker(i: usize) -> String {
    format!("entry-{i:04}")
}

#[tokio::test]
async fn test_entries_are_traced_in_write_order() {
    let sink = AsyncTraceSink::spawn_default(Recording::default()).unwrap();
    for i in 0..500 {
        sink.write_message(LogLevel::Information, marker(i)).unwrap();
    }

    sink.shutdown().await.unwrap();

    let expected: Vec<String> = (0..500).map(marker).collect();
    assert_eq!(sink.listener().messages(), expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shutdown_drains_every_queued_entry() {
    let sink = AsyncTraceSink::spawn_default(Recording::slow(Duration::from_millis(2))).unwrap();
    for i in 0..25 {
        sink.write_message(LogLevel::Debug, marker(i)).unwrap();
    }

    sink.shutdown().await.unwrap();

    assert_eq!(sink.listener().messages().len(), 25);
    let stats = sink.stats();
    assert_eq!(stats.processed, 25);
    assert_eq!(stats.abandoned, 0);
    assert_eq!(stats.depth, 0);
    assert!(!sink.is_running());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_stops_promptly_and_abandons_backlog() {
    let sink = AsyncTraceSink::spawn_default(Recording::slow(Duration::from_millis(20))).unwrap();
    for i in 0..100 {
        sink.write_message(LogLevel::Information, marker(i)).unwrap();
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    let started = Instant::now();
    sink.cancel().await;
    assert!(started.elapsed() < Duration::from_millis(100));

    let traced = sink.listener().messages();
    assert!(traced.len() < 100);
    let prefix: Vec<String> = (0..traced.len()).map(marker).collect();
    assert_eq!(traced, prefix);

    let stats = sink.stats();
    assert_eq!(stats.enqueued, 100);
    assert_eq!(stats.completed() + stats.abandoned, 100);
    assert!(stats.abandoned > 0);
}

#[tokio::test]
async fn test_cancel_before_processing_delivers_nothing() {
    let sink = AsyncTraceSink::spawn_default(Recording::default()).unwrap();
    for i in 0..100 {
        sink.write_message(LogLevel::Information, marker(i)).unwrap();
    }

    // current-thread runtime: the worker has not been polled yet
    timeout(Duration::from_millis(100), sink.cancel())
        .await
        .expect("cancel should complete promptly");

    assert!(sink.listener().messages().is_empty());
    assert_eq!(sink.stats().abandoned, 100);
}

#[tokio::test]
async fn test_failed_entry_does_not_stop_the_worker() {
    let listener = Recording {
        fail_marker: Some("entry-0003"),
        ..Default::default()
    };
    let sink = AsyncTraceSink::spawn_default(listener).unwrap();
    for i in 0..8 {
        sink.write_message(LogLevel::Warning, marker(i)).unwrap();
    }

    sink.shutdown().await.unwrap();

    let traced = sink.listener().messages();
    assert_eq!(traced.len(), 7);
    assert!(!traced.contains(&marker(3)));
    assert_eq!(traced.last(), Some(&marker(7)));
    assert_eq!(sink.stats().failed, 1);
}

#[tokio::test]
async fn test_shutdown_is_idempotent() {
    let sink = AsyncTraceSink::spawn_default(Recording::default()).unwrap();
    sink.write_message(LogLevel::Information, "once").unwrap();

    sink.shutdown().await.unwrap();
    sink.shutdown().await.unwrap();
    sink.cancel().await;

    assert_eq!(sink.listener().messages(), vec!["once".to_string()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_shutdown_calls_all_succeed() {
    let sink = AsyncTraceSink::spawn_default(Recording::slow(Duration::from_millis(5))).unwrap();
    for i in 0..10 {
        sink.write_message(LogLevel::Information, marker(i)).unwrap();
    }

    let (first, second) = tokio::join!(sink.shutdown(), sink.shutdown());

    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_eq!(sink.listener().messages().len(), 10);
}

#[tokio::test]
async fn test_write_after_shutdown_is_rejected() {
    let sink = AsyncTraceSink::spawn_default(Recording::default()).unwrap();
    sink.shutdown().await.unwrap();

    let result = sink.write_message(LogLevel::Error, "too late");

    assert!(matches!(result, Err(SinkError::Closed)));
    assert!(sink.listener().messages().is_empty());
}

#[tokio::test]
async fn test_flush_waits_for_backlog_without_stopping() {
    let sink = AsyncTraceSink::spawn_default(Recording::slow(Duration::from_millis(1))).unwrap();
    for i in 0..10 {
        sink.write_message(LogLevel::Information, marker(i)).unwrap();
    }

    sink.flush().await.unwrap();
    assert_eq!(sink.listener().messages().len(), 10);
    assert!(sink.is_running());

    sink.write_message(LogLevel::Information, "after flush").unwrap();
    sink.flush().await.unwrap();
    assert_eq!(sink.listener().messages().len(), 11);
    sink.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_flush_reports_timeout() {
    let sink = AsyncTraceSink::spawn_default(Recording::slow(Duration::from_millis(200))).unwrap();
    sink.write_message(LogLevel::Information, "slow").unwrap();

    let result = sink.flush_timeout(Duration::from_millis(20)).await;

    assert!(matches!(result, Err(SinkError::FlushTimeout(_))));
    sink.cancel().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shutdown_timeout_falls_back_to_cancel() {
    let config = ListenerConfig {
        shutdown_timeout: Duration::from_millis(50),
        ..Default::default()
    };
    let sink = AsyncTraceSink::spawn(Recording::slow(Duration::from_millis(30)), config).unwrap();
    for i in 0..20 {
        sink.write_message(LogLevel::Information, marker(i)).unwrap();
    }

    let result = timeout(Duration::from_secs(1), sink.shutdown())
        .await
        .expect("shutdown must return once the timeout fires");

    assert!(matches!(result, Err(SinkError::ShutdownTimeout(_))));
    assert!(!sink.is_running());
    assert!(sink.stats().abandoned > 0);
    assert!(sink.shutdown().await.is_ok());
}

#[tokio::test]
async fn test_dropping_the_sink_lets_the_worker_drain() {
    let listener = std::sync::Arc::new(Recording::default());
    let sink = AsyncTraceSink::spawn_default(listener.clone()).unwrap();
    for i in 0..5 {
        sink.write_message(LogLevel::Information, marker(i)).unwrap();
    }

    drop(sink);

    timeout(Duration::from_secs(1), async {
        while listener.messages().len() < 5 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("worker should drain after the sink is dropped");
}
