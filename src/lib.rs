#![deny(rust_2024_compatibility)]
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
#![allow(
    clippy::cast_possible_truncation, // Durations in milliseconds fit in u64
    clippy::missing_errors_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. SinkError in the sink modules
    clippy::must_use_candidate,
    clippy::doc_markdown
)]

//! Asynchronous trace sink.
//!
//! `write` enqueues and returns; a background worker owned by the sink
//! traces entries in order through a [`listener::TraceListener`]. The
//! worker can be stopped gracefully (drain, then close) or cancelled
//! outright.

pub mod app;
pub mod domain;
pub mod facade;
pub mod listener;

pub use domain::{LogEntry, LogLevel, LogPayload, LogSenderDetails, SinkError, TraceEventData};
pub use facade::{LogFactory, LogFactoryBuilder, LogSink, Logger};
pub use listener::{AsyncTraceSink, ListenerConfig, OverflowPolicy, QueueStats, TraceListener};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
