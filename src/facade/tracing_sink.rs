use super::sink::LogSink;
use crate::domain::{LogLevel, LogPayload, LogSenderDetails, SinkError, TraceEventData};
use crate::listener::base;

/// Traces every entry on the calling thread through `tracing`.
#[derive(Debug, Clone)]
pub struct TracingSink {
    name: String,
}

impl TracingSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl LogSink for TracingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(
        &self,
        level: LogLevel,
        payload: LogPayload,
        sender: Option<LogSenderDetails>,
    ) -> Result<(), SinkError> {
        let mut event = TraceEventData::new(level, self.name.as_str());
        if let Some(sender) = sender.as_ref() {
            event = event.with_sender(sender);
        }
        match &payload {
            LogPayload::Message(message) => base::trace_message(&event, message),
            LogPayload::Data(data) => base::trace_data(&event, data),
        }
        Ok(())
    }
}

/// Accepts everything and keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn name(&self) -> &str {
        "null"
    }

    fn write(
        &self,
        _level: LogLevel,
        _payload: LogPayload,
        _sender: Option<LogSenderDetails>,
    ) -> Result<(), SinkError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracing_test::traced_test;
    use uuid::Uuid;

    #[traced_test]
    #[test]
    fn test_tracing_sink_emits_message_with_sender() {
        let sink = TracingSink::new("inline");
        let customer = Uuid::new_v4();
        sink.write(
            LogLevel::Error,
            "payment declined".into(),
            Some(LogSenderDetails::for_customer(customer)),
        )
        .unwrap();

        assert!(logs_contain("payment declined"));
        assert!(logs_contain(&customer.to_string()));
    }

    #[traced_test]
    #[test]
    fn test_tracing_sink_emits_data() {
        let sink = TracingSink::new("inline");
        sink.write(LogLevel::Information, json!({"retries": 3}).into(), None)
            .unwrap();
        assert!(logs_contain("retries"));
    }

    #[test]
    fn test_null_sink_accepts_everything() {
        let sink = NullSink;
        assert!(sink.is_enabled(LogLevel::Critical));
        assert!(!sink.is_enabled(LogLevel::None));
        assert!(sink.write(LogLevel::Debug, "gone".into(), None).is_ok());
    }
}
