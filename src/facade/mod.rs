//! Application-facing logging API.
//!
//! A [`LogFactory`] hands out named [`Logger`]s whose minimum level is
//! resolved from prefix filters. Every logger writes to the same set of
//! [`LogSink`]s: an `AsyncTraceSink`, a synchronous [`TracingSink`], or
//! anything else implementing the trait.

pub mod factory;
pub mod logger;
pub mod sink;
pub mod tracing_sink;

pub use factory::{DEFAULT_MINIMUM_LEVEL, LogFactory, LogFactoryBuilder};
pub use logger::Logger;
pub use sink::LogSink;
pub use tracing_sink::{NullSink, TracingSink};
