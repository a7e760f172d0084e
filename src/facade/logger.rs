use super::sink::LogSink;
use crate::domain::{LogLevel, LogPayload, LogSenderDetails};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// A named handle for writing log entries to every sink of a
/// [`LogFactory`](super::LogFactory).
///
/// Logging never fails from the caller's point of view: entries below the
/// logger's minimum level are skipped, and sink errors or unserializable data
/// are reported as internal `debug` diagnostics and otherwise ignored.
#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
    minimum_level: LogLevel,
    sinks: Arc<[Arc<dyn LogSink>]>,
}

impl Logger {
    pub(crate) fn new(
        name: impl Into<Arc<str>>,
        minimum_level: LogLevel,
        sinks: Arc<[Arc<dyn LogSink>]>,
    ) -> Self {
        Self {
            name: name.into(),
            minimum_level,
            sinks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn minimum_level(&self) -> LogLevel {
        self.minimum_level
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::None && level >= self.minimum_level
    }

    pub fn write(&self, level: LogLevel, message: impl Into<String>) {
        if self.is_enabled(level) {
            self.dispatch(level, LogPayload::Message(message.into()), None);
        }
    }

    pub fn write_data<T: Serialize + ?Sized>(&self, level: LogLevel, data: &T) {
        self.write_data_inner(level, data, None);
    }

    pub fn write_for_customer(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        customer_id: Uuid,
    ) {
        if self.is_enabled(level) {
            self.dispatch(
                level,
                LogPayload::Message(message.into()),
                Some(LogSenderDetails::for_customer(customer_id)),
            );
        }
    }

    pub fn write_data_for_customer<T: Serialize + ?Sized>(
        &self,
        level: LogLevel,
        data: &T,
        customer_id: Uuid,
    ) {
        self.write_data_inner(level, data, Some(LogSenderDetails::for_customer(customer_id)));
    }

    pub fn write_data_with_sender<T: Serialize + ?Sized>(
        &self,
        level: LogLevel,
        data: &T,
        sender: LogSenderDetails,
    ) {
        self.write_data_inner(level, data, Some(sender));
    }

    fn write_data_inner<T: Serialize + ?Sized>(
        &self,
        level: LogLevel,
        data: &T,
        sender: Option<LogSenderDetails>,
    ) {
        if !self.is_enabled(level) {
            return;
        }
        match LogPayload::data(data) {
            Ok(payload) => self.dispatch(level, payload, sender),
            Err(e) => debug!(logger = %self.name, error = %e, "Log data could not be serialized"),
        }
    }

    fn dispatch(&self, level: LogLevel, payload: LogPayload, sender: Option<LogSenderDetails>) {
        for sink in self.sinks.iter().filter(|sink| sink.is_enabled(level)) {
            if let Err(e) = sink.write(level, payload.clone(), sender) {
                debug!(
                    logger = %self.name,
                    sink = sink.name(),
                    error = %e,
                    "Log sink rejected entry"
                );
            }
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("minimum_level", &self.minimum_level)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
