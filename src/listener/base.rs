//! Default behaviour behind the `TraceListener` hooks.
//!
//! The trait's default methods call straight into these functions. An
//! implementation that overrides a hook to observe it can call the matching
//! function here to keep the default behaviour:
//!
//! ```ignore
//! fn trace_message(&self, event: &TraceEventData, message: &str) {
//!     self.calls.fetch_add(1, Ordering::Relaxed);
//!     base::trace_message(event, message);
//! }
//! ```

use super::traits::TraceListener;
use crate::domain::{LogEntry, LogLevel, LogPayload, SinkError, TraceEventData};
use tokio_util::sync::CancellationToken;

/// Target used for events emitted by the default hooks.
pub const TRACE_TARGET: &str = "async_trace_sink::trace";

macro_rules! emit_at_level {
    ($event:expr, $($body:tt)+) => {
        match $event.level {
            LogLevel::Trace => tracing::trace!(target: TRACE_TARGET, $($body)+),
            LogLevel::Debug => tracing::debug!(target: TRACE_TARGET, $($body)+),
            LogLevel::Information => tracing::info!(target: TRACE_TARGET, $($body)+),
            LogLevel::Warning => tracing::warn!(target: TRACE_TARGET, $($body)+),
            LogLevel::Error | LogLevel::Critical => tracing::error!(target: TRACE_TARGET, $($body)+),
            LogLevel::None => {}
        }
    };
}

/// Emits a message as a `tracing` event at the entry's level.
pub fn trace_message(event: &TraceEventData, message: &str) {
    emit_at_level!(
        event,
        source = %event.source,
        correlation_id = %event.correlation_id,
        customer_id = ?event.customer_id,
        session_id = ?event.session_id,
        critical = event.level == LogLevel::Critical,
        "{}",
        message
    );
}

/// Emits structured data as a `tracing` event at the entry's level.
pub fn trace_data(event: &TraceEventData, data: &serde_json::Value) {
    emit_at_level!(
        event,
        source = %event.source,
        correlation_id = %event.correlation_id,
        customer_id = ?event.customer_id,
        session_id = ?event.session_id,
        critical = event.level == LogLevel::Critical,
        data = %data,
        "structured log data"
    );
}

/// Default asynchronous trace: builds the event descriptor and hands the
/// payload to the listener's synchronous hook.
pub async fn trace_async<L>(
    listener: &L,
    entry: &LogEntry,
    cancel: &CancellationToken,
) -> Result<(), SinkError>
where
    L: TraceListener + ?Sized,
{
    if cancel.is_cancelled() {
        return Err(SinkError::Cancelled);
    }
    dispatch(listener, entry);
    Ok(())
}

/// Routes one entry to `trace_message` or `trace_data` depending on its payload.
pub fn dispatch<L>(listener: &L, entry: &LogEntry)
where
    L: TraceListener + ?Sized,
{
    let event = TraceEventData::from_entry(entry, listener.name());
    match entry.payload() {
        LogPayload::Message(message) => listener.trace_message(&event, message),
        LogPayload::Data(data) => listener.trace_data(&event, data),
    }
}
