use crate::domain::{LogLevel, LogPayload, LogSenderDetails, SinkError};
use crate::listener::{AsyncTraceSink, TraceListener};

/// A destination a [`Logger`](super::Logger) writes into.
///
/// `write` is synchronous from the caller's point of view. Sinks that do
/// I/O are expected to hand the entry off and return.
pub trait LogSink: Send + Sync {
    fn name(&self) -> &str;

    fn is_enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::None
    }

    fn write(
        &self,
        level: LogLevel,
        payload: LogPayload,
        sender: Option<LogSenderDetails>,
    ) -> Result<(), SinkError>;
}

impl<L: TraceListener + 'static> LogSink for AsyncTraceSink<L> {
    fn name(&self) -> &str {
        AsyncTraceSink::name(self)
    }

    fn is_enabled(&self, level: LogLevel) -> bool {
        AsyncTraceSink::is_enabled(self, level)
    }

    fn write(
        &self,
        level: LogLevel,
        payload: LogPayload,
        sender: Option<LogSenderDetails>,
    ) -> Result<(), SinkError> {
        AsyncTraceSink::write(self, level, payload, sender)
    }
}
