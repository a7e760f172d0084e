//! Asynchronous trace listener: the queue, its worker and the sink that owns them.

pub mod backpressure;
pub mod base;
pub mod destination;
pub mod metrics;
pub mod queue;
pub mod sink;
pub mod traits;
pub mod worker;

pub use backpressure::{OverflowPolicy, PushOutcome};
pub use destination::{DestinationListener, TraceDestination, WriterDestination};
pub use metrics::{Completion, QueueStats};
pub use queue::{MAX_QUEUE_CAPACITY, RequestQueue};
pub use sink::{
    AsyncTraceSink, DEFAULT_FLUSH_TIMEOUT, DEFAULT_QUEUE_CAPACITY, DEFAULT_SHUTDOWN_TIMEOUT,
    ListenerConfig,
};
pub use traits::{DEFAULT_LISTENER_NAME, TraceListener};
pub use worker::{WorkerExit, process_queue};
