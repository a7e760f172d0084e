use super::traits::{DEFAULT_LISTENER_NAME, TraceListener};
use crate::domain::{LogEntry, SinkError};
use async_trait::async_trait;
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// Where traced entries end up: console, file, socket, remote collector.
///
/// The listener treats a destination as an opaque asynchronous write that
/// either succeeds or fails.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TraceDestination: Send + Sync {
    async fn write_entry(&self, entry: &LogEntry) -> Result<(), SinkError>;

    async fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Writes each entry as one JSON line to an async writer.
pub struct WriterDestination<W> {
    writer: Mutex<W>,
}

impl<W> WriterDestination<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub async fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl WriterDestination<Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl WriterDestination<tokio::fs::File> {
    /// Opens `path` for appending, creating it if needed.
    pub async fn append_to_file<P: AsRef<Path>>(path: P) -> Result<Self, SinkError> {
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())
            .await?;
        debug!(path = %path.as_ref().display(), "Opened file trace destination");
        Ok(Self::new(file))
    }
}

#[async_trait]
impl<W> TraceDestination for WriterDestination<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write_entry(&self, entry: &LogEntry) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), SinkError> {
        self.writer.lock().await.flush().await?;
        Ok(())
    }
}

/// Adapts a `TraceDestination` into a `TraceListener` whose asynchronous
/// trace writes the entry to the destination.
pub struct DestinationListener<D> {
    name: String,
    destination: D,
}

impl<D: TraceDestination> DestinationListener<D> {
    pub fn new(destination: D) -> Self {
        Self::named(DEFAULT_LISTENER_NAME, destination)
    }

    pub fn named(name: impl Into<String>, destination: D) -> Self {
        Self {
            name: name.into(),
            destination,
        }
    }

    pub fn destination(&self) -> &D {
        &self.destination
    }
}

#[async_trait]
impl<D: TraceDestination> TraceListener for DestinationListener<D> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn trace_async(
        &self,
        entry: &LogEntry,
        cancel: &CancellationToken,
    ) -> Result<(), SinkError> {
        if cancel.is_cancelled() {
            return Err(SinkError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SinkError::Cancelled),
            result = self.destination.write_entry(entry) => result,
        }
    }
}
