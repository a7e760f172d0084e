//! Domain layer for async-trace-sink.
//!
//! Contains the canonical types shared across all modules:
//! - `LogEntry`: one immutable snapshot of a logging call
//! - `TraceEventData`: the descriptor handed to synchronous trace hooks
//! - `LogSenderDetails`: optional customer/session identifiers
//! - `LogLevel`: severity (Trace/Debug/Information/Warning/Error/Critical)
//! - `SinkError`: error type shared by sinks and listeners

pub mod error;
pub mod log_entry;
pub mod log_level;
pub mod sender_details;
pub mod trace_event;

pub use error::SinkError;
pub use log_entry::{LogEntry, LogPayload};
pub use log_level::LogLevel;
pub use sender_details::LogSenderDetails;
pub use trace_event::TraceEventData;
