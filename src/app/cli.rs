use super::config::SinkConfig;
use crate::domain::LogLevel;
use clap::Parser;
use std::path::PathBuf;

/// Reads lines and traces each one through an asynchronous trace sink.
#[derive(Parser, Debug, Clone)]
#[command(name = "trace-sink", author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub sink: SinkConfig,

    /// TOML file with sink settings; flags and TRACE_SINK_* variables that are set take precedence
    #[arg(long, env = "TRACE_SINK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Read lines from this file instead of stdin
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Append JSON lines to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Level of every entry written
    #[arg(long, default_value = "information")]
    pub level: LogLevel,

    /// Artificial delay per traced entry, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,
}
