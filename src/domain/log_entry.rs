use super::error::SinkError;
use super::log_level::LogLevel;
use super::sender_details::LogSenderDetails;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a logging call carried: a plain message or structured data, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogPayload {
    Message(String),
    Data(serde_json::Value),
}

impl LogPayload {
    /// Serializes `data` into a structured payload.
    pub fn data<T: Serialize + ?Sized>(data: &T) -> Result<Self, SinkError> {
        Ok(LogPayload::Data(serde_json::to_value(data)?))
    }

    pub fn as_message(&self) -> Option<&str> {
        match self {
            LogPayload::Message(message) => Some(message),
            LogPayload::Data(_) => None,
        }
    }

    pub fn as_data(&self) -> Option<&serde_json::Value> {
        match self {
            LogPayload::Message(_) => None,
            LogPayload::Data(data) => Some(data),
        }
    }
}

impl From<&str> for LogPayload {
    fn from(message: &str) -> Self {
        LogPayload::Message(message.to_string())
    }
}

impl From<String> for LogPayload {
    fn from(message: String) -> Self {
        LogPayload::Message(message)
    }
}

impl From<serde_json::Value> for LogPayload {
    fn from(data: serde_json::Value) -> Self {
        LogPayload::Data(data)
    }
}

/// Immutable snapshot of one logging call.
///
/// The timestamp is taken when the entry is built, which happens on the
/// caller's thread inside `write`, so it reflects when the event occurred and
/// not when the background worker got around to it. `sequence` is assigned by
/// the request queue at enqueue time and increases by one per accepted entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    id: Uuid,
    sequence: u64,
    level: LogLevel,
    timestamp: DateTime<Utc>,
    payload: LogPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sender: Option<LogSenderDetails>,
}

impl LogEntry {
    pub fn new(level: LogLevel, payload: LogPayload, sender: Option<LogSenderDetails>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence: 0,
            level,
            timestamp: Utc::now(),
            payload,
            sender,
        }
    }

    pub(crate) fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn payload(&self) -> &LogPayload {
        &self.payload
    }

    pub fn sender(&self) -> Option<&LogSenderDetails> {
        self.sender.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.payload.as_message()
    }

    pub fn data(&self) -> Option<&serde_json::Value> {
        self.payload.as_data()
    }
}
