use super::log_entry::LogEntry;
use super::log_level::LogLevel;
use super::sender_details::LogSenderDetails;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Descriptor passed to the synchronous trace hooks.
///
/// Smaller than a `LogEntry`: it carries the severity, the name of the
/// listener doing the tracing and correlation information, but not the
/// payload, which is handed to the hook separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEventData {
    pub level: LogLevel,
    pub source: String,
    pub correlation_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
}

impl TraceEventData {
    /// Event data for code that traces directly, outside the queue.
    pub fn new(level: LogLevel, source: impl Into<String>) -> Self {
        Self {
            level,
            source: source.into(),
            correlation_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            customer_id: None,
            session_id: None,
        }
    }

    pub fn from_entry(entry: &LogEntry, source: impl Into<String>) -> Self {
        let sender = entry.sender().copied().unwrap_or_default();
        Self {
            level: entry.level(),
            source: source.into(),
            correlation_id: entry.id(),
            timestamp: entry.timestamp(),
            customer_id: sender.effective_customer_id(),
            session_id: sender.effective_session_id(),
        }
    }

    pub fn with_sender(mut self, sender: &LogSenderDetails) -> Self {
        self.customer_id = sender.effective_customer_id();
        self.session_id = sender.effective_session_id();
        self
    }
}
