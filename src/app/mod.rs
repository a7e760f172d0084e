pub mod cli;
pub mod config;
pub mod initialization;
pub mod logging_system;

pub use cli::Cli;
pub use config::{ConfigError, DiagnosticLevel, SinkConfig};
pub use initialization::InitializationError;
pub use logging_system::{LogFormat, LoggingSystem, setup_logging_safe};

use crate::domain::{LogEntry, LogLevel, SinkError};
use crate::listener::{
    AsyncTraceSink, DestinationListener, QueueStats, TraceListener, WriterDestination,
};
use anyhow::{Context, bail};
use async_trait::async_trait;
use clap::{ArgMatches, CommandFactory, FromArgMatches};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

type BoxedWriter = Box<dyn AsyncWrite + Unpin + Send>;
type CliListener = Paced<DestinationListener<WriterDestination<BoxedWriter>>>;

/// Delays each trace by a fixed amount before delegating, so a backlog can
/// be observed draining.
pub struct Paced<L> {
    inner: L,
    delay: Duration,
}

impl<L> Paced<L> {
    pub fn new(inner: L, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl<L: TraceListener> TraceListener for Paced<L> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn trace_async(
        &self,
        entry: &LogEntry,
        cancel: &CancellationToken,
    ) -> Result<(), SinkError> {
        if !self.delay.is_zero() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SinkError::Cancelled),
                _ = tokio::time::sleep(self.delay) => {}
            }
        }
        self.inner.trace_async(entry, cancel).await
    }
}

pub struct App {
    cli: Cli,
}

impl App {
    pub fn from_args<I, T>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::from_matches(&Cli::command().try_get_matches_from(args)?)
    }

    /// Builds the app from parsed arguments. With `--config`, flags and
    /// `TRACE_SINK_*` variables that were actually given override the file.
    pub fn from_matches(args: &ArgMatches) -> anyhow::Result<Self> {
        let mut cli = Cli::from_arg_matches(args)?;
        if let Some(path) = &cli.config {
            let file = SinkConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            cli.sink.merge_over(&file, args)?;
        } else {
            cli.sink.post_process()?;
            cli.sink.validate()?;
        }
        Ok(Self { cli })
    }

    pub fn config(&self) -> &SinkConfig {
        &self.cli.sink
    }

    /// Traces every input line, then drains and shuts the sink down.
    /// Ctrl+C cancels immediately and abandons whatever is still queued.
    pub async fn run(self) -> anyhow::Result<QueueStats> {
        let writer: BoxedWriter = match &self.cli.output {
            Some(path) => Box::new(
                tokio::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .await
                    .with_context(|| format!("Failed to open output {}", path.display()))?,
            ),
            None => Box::new(tokio::io::stdout()),
        };
        let reader: Box<dyn AsyncRead + Unpin + Send> = match &self.cli.input {
            Some(path) => Box::new(
                tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("Failed to open input {}", path.display()))?,
            ),
            None => Box::new(tokio::io::stdin()),
        };

        let listener: CliListener = Paced::new(
            DestinationListener::named(&self.cli.sink.name, WriterDestination::new(writer)),
            Duration::from_millis(self.cli.delay_ms),
        );
        let sink = AsyncTraceSink::spawn(listener, self.cli.sink.listener_config())?;
        let cancel = sink.cancellation_token();
        let interrupt = spawn_interrupt_handler(cancel.clone());

        info!(
            listener = sink.name(),
            level = %self.cli.level,
            "Tracing input lines"
        );

        let result = Self::pump(&sink, reader, self.cli.level, &cancel).await;

        if !cancel.is_cancelled()
            && let Err(e) = sink.flush().await
        {
            warn!(error = %e, "Flush incomplete, continuing with shutdown");
        }
        let shutdown = sink.shutdown().await;
        interrupt.abort();

        let stats = sink.stats();
        info!(
            processed = stats.processed,
            failed = stats.failed,
            dropped = stats.dropped,
            abandoned = stats.abandoned,
            "Trace sink finished"
        );

        result?;
        if let Err(e) = shutdown {
            error!(error = %e, "Trace sink did not shut down cleanly");
            return Err(e.into());
        }
        if cancel.is_cancelled() {
            bail!("Interrupted, {} entries abandoned", stats.abandoned);
        }
        Ok(stats)
    }

    async fn pump<L: TraceListener + 'static>(
        sink: &AsyncTraceSink<L>,
        reader: impl AsyncRead + Unpin,
        level: LogLevel,
        cancel: &CancellationToken,
    ) -> anyhow::Result<()> {
        let mut lines = BufReader::new(reader).lines();
        loop {
            let line = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(()),
                line = lines.next_line() => line.context("Failed to read input")?,
            };
            let Some(line) = line else {
                return Ok(());
            };
            if line.trim().is_empty() {
                continue;
            }
            match sink.write_message(level, line) {
                Ok(()) => {}
                Err(SinkError::Closed) => return Ok(()),
                Err(e) => warn!(error = %e, "Entry not queued"),
            }
        }
    }
}

fn spawn_interrupt_handler(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received SIGINT (Ctrl+C), cancelling trace sink");
                cancel.cancel();
            }
            Err(err) => error!("Failed to listen for SIGINT: {}", err),
        }
    })
}

pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub async fn main() -> anyhow::Result<()> {
    let app = App::from_matches(&Cli::command().get_matches())?;

    if let Err(e) = setup_logging_safe(app.config().log_level) {
        eprintln!("Warning: {e}, continuing without diagnostics");
    }
    info!("Starting trace-sink v{}", get_version());

    app.run().await?;
    Ok(())
}
