use std::time::Duration;
use thiserror::Error;

/// Errors raised by sinks, listeners and trace destinations.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Sink is closed")]
    Closed,

    #[error("Invalid queue capacity: {capacity}")]
    InvalidCapacity { capacity: usize },

    #[error("Request queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },

    #[error("Trace operation cancelled")]
    Cancelled,

    #[error("Flush did not complete within {0:?}")]
    FlushTimeout(Duration),

    #[error("Shutdown did not complete within {0:?}")]
    ShutdownTimeout(Duration),

    #[error("No tokio runtime available to run the queue worker")]
    NoRuntime,

    #[error("Trace failed: {0}")]
    Trace(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SinkError {
    /// True for the errors that mean the sink will never accept entries again.
    pub fn is_closed(&self) -> bool {
        matches!(self, SinkError::Closed)
    }
}
