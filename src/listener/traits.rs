use super::base;
use crate::domain::{LogEntry, SinkError, TraceEventData};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_LISTENER_NAME: &str = "async-trace";

/// The overridable operations of an asynchronous trace listener.
///
/// Every method has a default. `trace_async` is what the queue worker calls
/// for each entry; its default routes the entry to `trace_message` or
/// `trace_data`, whose defaults emit `tracing` events. Implementations
/// replace whichever layer they need and call into [`base`] to keep the
/// default behaviour of the layer they observe.
///
/// `trace_async` must honor `cancel`: when it is already cancelled, or
/// becomes cancelled while the call is running, the call returns promptly
/// (typically with `SinkError::Cancelled`) and the entry counts as not
/// delivered.
#[async_trait]
pub trait TraceListener: Send + Sync {
    /// Name reported as the source of every trace event.
    fn name(&self) -> &str {
        DEFAULT_LISTENER_NAME
    }

    fn trace_message(&self, event: &TraceEventData, message: &str) {
        base::trace_message(event, message);
    }

    fn trace_data(&self, event: &TraceEventData, data: &serde_json::Value) {
        base::trace_data(event, data);
    }

    async fn trace_async(
        &self,
        entry: &LogEntry,
        cancel: &CancellationToken,
    ) -> Result<(), SinkError> {
        base::trace_async(self, entry, cancel).await
    }
}

#[async_trait]
impl<T: TraceListener + ?Sized> TraceListener for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn trace_message(&self, event: &TraceEventData, message: &str) {
        (**self).trace_message(event, message);
    }

    fn trace_data(&self, event: &TraceEventData, data: &serde_json::Value) {
        (**self).trace_data(event, data);
    }

    async fn trace_async(
        &self,
        entry: &LogEntry,
        cancel: &CancellationToken,
    ) -> Result<(), SinkError> {
        (**self).trace_async(entry, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LogLevel;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Default)]
    struct Observing {
        messages: Mutex<Vec<String>>,
        data: Mutex<Vec<serde_json::Value>>,
    }

    impl TraceListener for Observing {
        fn name(&self) -> &str {
            "observing"
        }

        fn trace_message(&self, event: &TraceEventData, message: &str) {
            assert_eq!(event.source, "observing");
            self.messages.lock().push(message.to_string());
            base::trace_message(event, message);
        }

        fn trace_data(&self, event: &TraceEventData, data: &serde_json::Value) {
            self.data.lock().push(data.clone());
            base::trace_data(event, data);
        }
    }

    #[tokio::test]
    async fn test_default_trace_async_routes_to_hooks() {
        let listener = Observing::default();
        let token = CancellationToken::new();

        let message = LogEntry::new(LogLevel::Information, "hello".into(), None);
        let data = LogEntry::new(LogLevel::Debug, json!({"k": "v"}).into(), None);
        listener.trace_async(&message, &token).await.unwrap();
        listener.trace_async(&data, &token).await.unwrap();

        assert_eq!(*listener.messages.lock(), vec!["hello".to_string()]);
        assert_eq!(*listener.data.lock(), vec![json!({"k": "v"})]);
    }

    #[tokio::test]
    async fn test_arc_forwards_to_inner_listener() {
        let listener = Arc::new(Observing::default());
        let shared: Arc<Observing> = listener.clone();
        let entry = LogEntry::new(LogLevel::Error, "via arc".into(), None);

        TraceListener::trace_async(&shared, &entry, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(shared.name(), "observing");
        assert_eq!(*listener.messages.lock(), vec!["via arc".to_string()]);
    }
}
