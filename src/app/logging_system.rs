use super::config::DiagnosticLevel;
use super::initialization::{FallbackStrategy, InitializationError, LogDirective};
use parking_lot::RwLock;
use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Output format of the crate's own diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    /// `RUST_LOG_FORMAT=json` selects JSON; anything else is compact.
    pub fn from_env() -> Self {
        match std::env::var("RUST_LOG_FORMAT") {
            Ok(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Builds the global `tracing` subscriber for diagnostics.
///
/// Diagnostics always go to stderr so they never mix with entries a
/// destination writes to stdout.
pub struct LoggingSystem {
    directives: RwLock<Vec<LogDirective>>,
    level_override: RwLock<Option<DiagnosticLevel>>,
    fallback_level: DiagnosticLevel,
}

impl LoggingSystem {
    pub fn new() -> Self {
        Self {
            directives: RwLock::new(Vec::new()),
            level_override: RwLock::new(None),
            fallback_level: DiagnosticLevel::Info,
        }
    }

    /// Adds one `RUST_LOG`-style directive. A bare level (`debug`) replaces
    /// the default level, a bare target enables it at `trace`. Malformed
    /// directives are skipped and unknown levels replaced by the fallback
    /// level.
    pub fn add_directive(&self, directive_str: &str) -> Result<(), InitializationError> {
        if !directive_str.contains('=')
            && let Ok(level) = directive_str.trim().parse::<DiagnosticLevel>()
        {
            *self.level_override.write() = Some(level);
            return Ok(());
        }

        match LogDirective::parse(directive_str) {
            Ok(directive) => {
                self.directives.write().push(directive);
                Ok(())
            }
            Err(e) => match e.fallback_strategy() {
                FallbackStrategy::UseDefaultLevel => {
                    eprintln!("Warning: {e}, using default level");
                    let target = directive_str.split('=').next().unwrap_or_default().trim();
                    self.directives
                        .write()
                        .push(LogDirective::new(target, self.fallback_level));
                    Ok(())
                }
                FallbackStrategy::SkipDirective => {
                    eprintln!("Warning: {e}, skipping directive");
                    Ok(())
                }
                FallbackStrategy::UseStderrLogging => Err(e),
            },
        }
    }

    pub fn add_default_directives(&self) {
        let mut directives = self.directives.write();
        for target in ["tokio", "runtime", "mio"] {
            directives.push(LogDirective::new(target, DiagnosticLevel::Warn));
        }
    }

    pub fn build_filter_string(&self, default_level: DiagnosticLevel) -> String {
        let default_level = self.level_override.read().unwrap_or(default_level);
        let directives = self.directives.read();
        std::iter::once(default_level.as_str().to_string())
            .chain(directives.iter().map(LogDirective::to_filter_string))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn initialize_tracing(
        &self,
        default_level: DiagnosticLevel,
        format: LogFormat,
    ) -> Result<(), InitializationError> {
        let filter_string = self.build_filter_string(default_level);
        let env_filter = EnvFilter::try_new(&filter_string).map_err(|e| {
            InitializationError::LoggingInitFailed {
                details: format!("Failed to create EnvFilter with '{filter_string}'"),
                source: Box::new(e),
            }
        })?;

        let json = (format == LogFormat::Json).then(|| {
            fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_writer(std::io::stderr)
        });
        let compact = (format == LogFormat::Compact).then(|| {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact()
        });

        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(json)
            .with(compact);

        tracing::subscriber::set_global_default(subscriber).map_err(|e| {
            InitializationError::LoggingInitFailed {
                details: "Failed to set global tracing subscriber".to_string(),
                source: Box::new(e),
            }
        })
    }

    pub fn directive_count(&self) -> usize {
        self.directives.read().len()
    }
}

impl Default for LoggingSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Installs the diagnostics subscriber once per process. `RUST_LOG`
/// directives, when set, are appended to the defaults.
pub fn setup_logging_safe(level: DiagnosticLevel) -> Result<(), InitializationError> {
    static INIT: OnceLock<bool> = OnceLock::new();

    let initialized = *INIT.get_or_init(|| {
        let logging_system = LoggingSystem::new();
        logging_system.add_default_directives();
        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            for directive in rust_log.split(',').filter(|d| !d.trim().is_empty()) {
                if logging_system.add_directive(directive).is_err() {
                    return false;
                }
            }
        }
        logging_system
            .initialize_tracing(level, LogFormat::from_env())
            .is_ok()
    });

    if initialized {
        Ok(())
    } else {
        Err(InitializationError::LoggingInitFailed {
            details: "Logging system initialization failed".to_string(),
            source: Box::new(std::io::Error::other("Logging initialization error")),
        })
    }
}
