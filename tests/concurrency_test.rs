use async_trace_sink::{AsyncTraceSink, LogEntry, LogLevel, SinkError, TraceListener};
use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct Collecting {
    messages: Mutex<Vec<String>>,
}

#[async_trait]
impl TraceListener for Collecting {
    async fn trace_async(
        &self,
        entry: &LogEntry,
        _cancel: &CancellationToken,
    ) -> Result<(), SinkError> {
        if let Some(message) = entry.message() {
            self.messages.lock().push(message.to_string());
        }
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_lose_nothing_and_keep_per_writer_order() {
    let sink = Arc::new(AsyncTraceSink::spawn_default(Collecting::default()).unwrap());
    let writers = 8;
    let per_writer = 250;

    let tasks = (0..writers).map(|writer| {
        let sink = sink.clone();
        tokio::spawn(async move {
            for i in 0..per_writer {
                sink.write_message(LogLevel::Information, format!("{writer}:{i}"))
                    .unwrap();
                if i % 50 == 0 {
                    tokio::task::yield_now().await;
                }
            }
        })
    });
    for result in join_all(tasks).await {
        result.unwrap();
    }

    sink.shutdown().await.unwrap();

    let messages = sink.listener().messages.lock().clone();
    assert_eq!(messages.len(), writers * per_writer);

    let mut last_seen: HashMap<usize, usize> = HashMap::new();
    for message in &messages {
        let (writer, index) = message.split_once(':').unwrap();
        let writer: usize = writer.parse().unwrap();
        let index: usize = index.parse().unwrap();
        if let Some(previous) = last_seen.insert(writer, index) {
            assert!(index > previous, "writer {writer} out of order");
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_writes_racing_shutdown_are_traced_or_rejected() {
    let sink = Arc::new(AsyncTraceSink::spawn_default(Collecting::default()).unwrap());

    let writer = {
        let sink = sink.clone();
        tokio::spawn(async move {
            let mut accepted = 0usize;
            for i in 0..10_000 {
                match sink.write_message(LogLevel::Debug, format!("{i}")) {
                    Ok(()) => accepted += 1,
                    Err(SinkError::Closed) => break,
                    Err(e) => panic!("unexpected error: {e}"),
                }
                if i % 100 == 0 {
                    tokio::task::yield_now().await;
                }
            }
            accepted
        })
    };

    tokio::task::yield_now().await;
    sink.shutdown().await.unwrap();
    let accepted = writer.await.unwrap();

    assert_eq!(sink.listener().messages.lock().len(), accepted);
    assert_eq!(sink.stats().processed as usize, accepted);
}
