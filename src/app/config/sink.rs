use super::serde_helpers::{load_env_string, load_env_var};
use super::{ConfigError, DiagnosticLevel};
use crate::listener::{
    DEFAULT_LISTENER_NAME, DEFAULT_QUEUE_CAPACITY, ListenerConfig, OverflowPolicy,
};
use clap::parser::ValueSource;
use clap::{ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_PREFIX: &str = "TRACE_SINK_";
pub const DEFAULT_FLUSH_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 4_000;

/// Settings of one asynchronous trace sink, loadable from CLI flags,
/// `TRACE_SINK_*` environment variables or a TOML file.
#[derive(Args, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Listener name, reported as the source of every traced event
    #[arg(long, env = "TRACE_SINK_NAME", default_value = DEFAULT_LISTENER_NAME)]
    pub name: String,

    /// Maximum number of entries waiting to be traced
    #[arg(long, env = "TRACE_SINK_QUEUE_CAPACITY", default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: usize,

    /// What to do with a write when the queue is full (drop-newest, drop-oldest, reject)
    #[arg(long, env = "TRACE_SINK_OVERFLOW_POLICY", default_value = "drop-newest")]
    pub overflow_policy: OverflowPolicy,

    /// Flush timeout in milliseconds
    #[arg(long, env = "TRACE_SINK_FLUSH_TIMEOUT_MS", default_value_t = DEFAULT_FLUSH_TIMEOUT_MS)]
    pub flush_timeout_ms: u64,

    /// Graceful shutdown timeout in milliseconds
    #[arg(long, env = "TRACE_SINK_SHUTDOWN_TIMEOUT_MS", default_value_t = DEFAULT_SHUTDOWN_TIMEOUT_MS)]
    pub shutdown_timeout_ms: u64,

    /// Level of the sink's own diagnostics
    #[arg(long, env = "TRACE_SINK_LOG_LEVEL", value_enum, default_value = "info")]
    pub log_level: DiagnosticLevel,

    /// Derived fields (not CLI arguments)
    #[serde(skip)]
    #[arg(skip)]
    pub flush_timeout: Duration,

    #[serde(skip)]
    #[arg(skip)]
    pub shutdown_timeout: Duration,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_LISTENER_NAME.to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            overflow_policy: OverflowPolicy::default(),
            flush_timeout_ms: DEFAULT_FLUSH_TIMEOUT_MS,
            shutdown_timeout_ms: DEFAULT_SHUTDOWN_TIMEOUT_MS,
            log_level: DiagnosticLevel::default(),
            flush_timeout: Duration::from_millis(DEFAULT_FLUSH_TIMEOUT_MS),
            shutdown_timeout: Duration::from_millis(DEFAULT_SHUTDOWN_TIMEOUT_MS),
        }
    }
}

impl SinkConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: SinkConfig = toml::from_str(content)?;
        config.post_process()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = SinkConfig::default();

        load_env_string("TRACE_SINK_NAME", &mut config.name);
        load_env_var("TRACE_SINK_QUEUE_CAPACITY", &mut config.queue_capacity)?;
        load_env_var("TRACE_SINK_OVERFLOW_POLICY", &mut config.overflow_policy)?;
        load_env_var("TRACE_SINK_FLUSH_TIMEOUT_MS", &mut config.flush_timeout_ms)?;
        load_env_var("TRACE_SINK_SHUTDOWN_TIMEOUT_MS", &mut config.shutdown_timeout_ms)?;
        load_env_var("TRACE_SINK_LOG_LEVEL", &mut config.log_level)?;

        config.post_process()?;
        config.validate()?;
        Ok(config)
    }

    /// Takes from `base` every field that was not given on the command line
    /// or through its `TRACE_SINK_*` variable. `args` are the matches the
    /// flags in `self` were parsed from.
    pub fn merge_over(&mut self, base: &SinkConfig, args: &ArgMatches) -> Result<(), ConfigError> {
        let explicit = |id: &str| {
            matches!(
                args.value_source(id),
                Some(ValueSource::CommandLine | ValueSource::EnvVariable)
            )
        };

        if !explicit("name") {
            self.name = base.name.clone();
        }
        if !explicit("queue_capacity") {
            self.queue_capacity = base.queue_capacity;
        }
        if !explicit("overflow_policy") {
            self.overflow_policy = base.overflow_policy;
        }
        if !explicit("flush_timeout_ms") {
            self.flush_timeout_ms = base.flush_timeout_ms;
        }
        if !explicit("shutdown_timeout_ms") {
            self.shutdown_timeout_ms = base.shutdown_timeout_ms;
        }
        if !explicit("log_level") {
            self.log_level = base.log_level;
        }
        self.post_process()?;
        self.validate()
    }

    pub fn post_process(&mut self) -> Result<(), ConfigError> {
        self.name = self.name.trim().to_string();
        self.flush_timeout = Duration::from_millis(self.flush_timeout_ms);
        self.shutdown_timeout = Duration::from_millis(self.shutdown_timeout_ms);
        Ok(())
    }

    pub fn listener_config(&self) -> ListenerConfig {
        ListenerConfig {
            capacity: self.queue_capacity,
            overflow: self.overflow_policy,
            flush_timeout: self.flush_timeout,
            shutdown_timeout: self.shutdown_timeout,
        }
    }
}
