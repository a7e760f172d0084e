use super::config::DiagnosticLevel;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InitializationError {
    #[error("Invalid log level '{input}'. Valid levels: {valid_levels:?}")]
    InvalidLogLevel {
        input: String,
        valid_levels: Vec<String>,
    },

    #[error("Invalid directive format '{input}'. Expected: '{expected}'")]
    InvalidDirectiveFormat { input: String, expected: String },

    #[error("Empty target in directive '{input}'")]
    EmptyTarget { input: String },

    #[error("Logging system initialization failed: {details}")]
    LoggingInitFailed {
        details: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl InitializationError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            InitializationError::InvalidLogLevel { .. }
            | InitializationError::InvalidDirectiveFormat { .. }
            | InitializationError::EmptyTarget { .. } => true,
            InitializationError::LoggingInitFailed { .. } => false,
        }
    }

    pub fn fallback_strategy(&self) -> FallbackStrategy {
        match self {
            InitializationError::InvalidLogLevel { .. } => FallbackStrategy::UseDefaultLevel,
            InitializationError::InvalidDirectiveFormat { .. }
            | InitializationError::EmptyTarget { .. } => FallbackStrategy::SkipDirective,
            InitializationError::LoggingInitFailed { .. } => FallbackStrategy::UseStderrLogging,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackStrategy {
    UseDefaultLevel,
    SkipDirective,
    UseStderrLogging,
}

/// One `target=level` (or bare `target`) entry of the diagnostics filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDirective {
    pub target: String,
    pub level: DiagnosticLevel,
}

impl LogDirective {
    pub fn new(target: impl Into<String>, level: DiagnosticLevel) -> Self {
        Self {
            target: target.into(),
            level,
        }
    }

    pub fn parse(directive: &str) -> Result<Self, InitializationError> {
        let (target, level) = match directive.split_once('=') {
            Some((target, level)) => (target.trim(), Some(level)),
            None => (directive.trim(), None),
        };

        if target.is_empty() {
            return Err(InitializationError::EmptyTarget {
                input: directive.to_string(),
            });
        }
        if target.contains(char::is_whitespace) {
            return Err(InitializationError::InvalidDirectiveFormat {
                input: directive.to_string(),
                expected: "target[=level]".to_string(),
            });
        }

        // a bare target enables everything it emits, as EnvFilter does
        let Some(level) = level else {
            return Ok(LogDirective::new(target, DiagnosticLevel::Trace));
        };

        let level = level
            .trim()
            .parse::<DiagnosticLevel>()
            .map_err(|_| InitializationError::InvalidLogLevel {
                input: level.trim().to_string(),
                valid_levels: ["error", "warn", "info", "debug", "trace"]
                    .iter()
                    .map(|level| (*level).to_string())
                    .collect(),
            })?;

        Ok(LogDirective::new(target, level))
    }

    /// Form accepted by `tracing_subscriber::EnvFilter`.
    pub fn to_filter_string(&self) -> String {
        format!("{}={}", self.target, self.level.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_directive() {
        let directive = LogDirective::parse(" tokio = warning ").unwrap();
        assert_eq!(directive, LogDirective::new("tokio", DiagnosticLevel::Warn));
        assert_eq!(directive.to_filter_string(), "tokio=warn");
    }

    #[test]
    fn test_parse_bare_target_enables_all_levels() {
        let directive = LogDirective::parse("my_crate").unwrap();
        assert_eq!(directive, LogDirective::new("my_crate", DiagnosticLevel::Trace));
        assert_eq!(directive.to_filter_string(), "my_crate=trace");
    }

    #[test]
    fn test_parse_errors_carry_fallback_strategy() {
        let spaced = LogDirective::parse("my crate=debug").unwrap_err();
        assert_eq!(spaced.fallback_strategy(), FallbackStrategy::SkipDirective);

        let empty = LogDirective::parse("=debug").unwrap_err();
        assert!(matches!(empty, InitializationError::EmptyTarget { .. }));

        let level = LogDirective::parse("tokio=loud").unwrap_err();
        assert_eq!(level.fallback_strategy(), FallbackStrategy::UseDefaultLevel);
        assert!(level.is_recoverable());
    }
}
