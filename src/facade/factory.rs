use super::logger::Logger;
use super::sink::LogSink;
use crate::domain::LogLevel;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_MINIMUM_LEVEL: LogLevel = LogLevel::Information;

/// Collects settings and sinks, then builds a [`LogFactory`].
///
/// Sinks are only handed out by `build`, and building again yields a
/// factory with the same sinks, never duplicates.
#[derive(Clone)]
pub struct LogFactoryBuilder {
    minimum_level: LogLevel,
    filters: Vec<(String, LogLevel)>,
    sinks: Vec<Arc<dyn LogSink>>,
}

impl Default for LogFactoryBuilder {
    fn default() -> Self {
        Self {
            minimum_level: DEFAULT_MINIMUM_LEVEL,
            filters: Vec::new(),
            sinks: Vec::new(),
        }
    }
}

impl LogFactoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_minimum_level(mut self, level: LogLevel) -> Self {
        self.minimum_level = level;
        self
    }

    /// Sets the minimum level for loggers named `prefix` or nested below it.
    /// A later filter for the same prefix replaces the earlier one.
    pub fn add_filter(mut self, prefix: impl Into<String>, level: LogLevel) -> Self {
        let prefix = prefix.into();
        match self.filters.iter_mut().find(|(existing, _)| *existing == prefix) {
            Some(filter) => filter.1 = level,
            None => self.filters.push((prefix, level)),
        }
        self
    }

    /// Adds a sink. Adding the same sink again has no effect.
    pub fn add_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        if !self.sinks.iter().any(|existing| Arc::ptr_eq(existing, &sink)) {
            self.sinks.push(sink);
        }
        self
    }

    pub fn build(&self) -> LogFactory {
        let mut filters = self.filters.clone();
        // longest prefix first, so the first match is the most specific
        filters.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        debug!(
            minimum_level = %self.minimum_level,
            filters = filters.len(),
            sinks = self.sinks.len(),
            "Built log factory"
        );

        LogFactory {
            minimum_level: self.minimum_level,
            filters,
            sinks: self.sinks.iter().cloned().collect(),
        }
    }
}

/// Creates [`Logger`]s that share the same sinks.
#[derive(Clone)]
pub struct LogFactory {
    minimum_level: LogLevel,
    filters: Vec<(String, LogLevel)>,
    sinks: Arc<[Arc<dyn LogSink>]>,
}

impl LogFactory {
    pub fn builder() -> LogFactoryBuilder {
        LogFactoryBuilder::new()
    }

    pub fn create(&self, name: &str) -> Logger {
        Logger::new(name, self.minimum_level_for(name), self.sinks.clone())
    }

    /// Minimum level for a logger name: the level of the longest matching
    /// filter prefix, or the factory default.
    pub fn minimum_level_for(&self, name: &str) -> LogLevel {
        self.filters
            .iter()
            .find(|(prefix, _)| matches_prefix(name, prefix))
            .map(|(_, level)| *level)
            .unwrap_or(self.minimum_level)
    }

    pub fn sinks(&self) -> &[Arc<dyn LogSink>] {
        &self.sinks
    }
}

impl std::fmt::Debug for LogFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogFactory")
            .field("minimum_level", &self.minimum_level)
            .field("filters", &self.filters)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

/// `prefix` matches `name` itself and any name nested below it with `.` or `::`.
fn matches_prefix(name: &str, prefix: &str) -> bool {
    match name.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with('.') || rest.starts_with("::"),
        None => false,
    }
}
